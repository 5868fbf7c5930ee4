use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::time::Instant;

use crate::foundation::core::Millis;

/// Source of "now" for the animation scheduler.
pub trait Clock: Send + Sync {
    /// Current time on the diagram timeline.
    fn now(&self) -> Millis;
}

/// Monotonic wall clock anchored at construction.
///
/// Backed by `tokio::time::Instant`, so a paused tokio runtime drives it deterministically.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at `Millis(0)`.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        Millis::from_duration(self.origin.elapsed())
    }
}

/// Explicitly advanced clock for headless sampling and tests. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at `Millis(0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Millis) -> Millis {
        Millis(self.now.fetch_add(by.0, Ordering::SeqCst).saturating_add(by.0))
    }

    /// Jump to `t`.
    pub fn set(&self, t: Millis) {
        self.now.store(t.0, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.load(Ordering::SeqCst))
    }
}

/// A named, time-bounded visual interpolation.
///
/// Playing a transition occupies its animator for exactly `duration`; the visual values during
/// that window come from the stage's rendering hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Transition {
    /// Name of the visual variant being animated to.
    pub name: &'static str,
    /// Declared length.
    pub duration: Millis,
}

impl Transition {
    /// Declare a transition lasting `ms` milliseconds.
    pub const fn new(name: &'static str, ms: u64) -> Self {
        Self {
            name,
            duration: Millis(ms),
        }
    }

    /// A transition that snaps to its target immediately.
    pub const fn instant(name: &'static str) -> Self {
        Self::new(name, 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/clock.rs"]
mod tests;
