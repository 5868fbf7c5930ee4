use std::time::Duration;

/// Milliseconds elapsed on an animator timeline.
///
/// Every animator measures time from its own mount point, so `Millis(0)` is the instant a stage
/// was put on screen.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Zero duration / timeline origin.
    pub const ZERO: Self = Self(0);

    /// Saturating `self - earlier`.
    pub fn since(self, earlier: Millis) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }

    /// Saturating addition.
    pub fn plus(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }

    /// Convert from a std [`Duration`], saturating at `u64::MAX` milliseconds.
    pub fn from_duration(d: Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// Normalized progress of `self` through a span of `len`, clamped to `[0, 1]`.
    ///
    /// Zero-length spans are always complete.
    pub fn progress_in(self, len: Millis) -> f64 {
        if len.0 == 0 {
            return 1.0;
        }
        (self.0 as f64 / len.0 as f64).clamp(0.0, 1.0)
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
