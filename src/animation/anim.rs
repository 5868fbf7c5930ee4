use crate::{
    animation::ease::Ease,
    foundation::core::Millis,
    foundation::error::{PipevizError, PipevizResult},
};

/// Sampling context handed to animation evaluators.
#[derive(Clone, Copy, Debug)]
pub struct SampleCtx {
    /// Time since the owning step (or animator) started.
    pub local: Millis,
}

impl SampleCtx {
    pub fn at(local: Millis) -> Self {
        Self { local }
    }
}

/// Interpolation contract for animated values.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Animated value: explicit keyframes or a time-remapping expression over another animation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Anim<T> {
    /// Piecewise animation defined by keyframes.
    Keyframes(Keyframes<T>),
    /// Time remap of an inner animation.
    Expr(Expr<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone,
{
    /// Sample the value at `ctx.local`.
    pub fn sample(&self, ctx: SampleCtx) -> PipevizResult<T> {
        match self {
            Self::Keyframes(kf) => kf.sample(ctx),
            Self::Expr(expr) => expr.sample(ctx),
        }
    }
}

/// Keyframed animation with an optional default value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Keys sorted by `at`.
    pub keys: Vec<Keyframe<T>>,
    /// Value used when `keys` is empty.
    pub default: Option<T>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Sample in local time. Values hold before the first and after the last key.
    pub fn sample(&self, ctx: SampleCtx) -> PipevizResult<T> {
        if self.keys.is_empty() {
            return self
                .default
                .clone()
                .ok_or_else(|| PipevizError::animation("Keyframes has no keys and no default"));
        }

        let t = ctx.local;
        let idx = self.keys.partition_point(|k| k.at <= t);

        if idx == 0 {
            return Ok(self.keys[0].value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.at.since(a.at);
        if span == Millis::ZERO {
            return Ok(a.value.clone());
        }

        let te = a.ease.apply(t.since(a.at).progress_in(span));
        Ok(T::lerp(&a.value, &b.value, te))
    }
}

/// One keyframe.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Local time of this key.
    pub at: Millis,
    /// Value at `at`.
    pub value: T,
    /// Easing toward the next key.
    pub ease: Ease,
}

/// Time-remapping expressions.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Expr<T> {
    /// Start `inner` `by` later; earlier samples see `inner` at time zero.
    Delay { inner: Box<Anim<T>>, by: Millis },
    /// Restart `inner` every `period`.
    Loop { inner: Box<Anim<T>>, period: Millis },
}

impl<T> Expr<T>
where
    T: Lerp + Clone,
{
    /// Sample the remapped inner animation.
    pub fn sample(&self, ctx: SampleCtx) -> PipevizResult<T> {
        match self {
            Self::Delay { inner, by } => inner.sample(SampleCtx::at(ctx.local.since(*by))),
            Self::Loop { inner, period } => {
                if *period == Millis::ZERO {
                    return Err(PipevizError::animation("Loop period must be > 0"));
                }
                inner.sample(SampleCtx::at(Millis(ctx.local.0 % period.0)))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
