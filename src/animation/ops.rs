use crate::animation::anim::{Anim, Expr, Keyframe, Keyframes, SampleCtx};
use crate::animation::ease::Ease;
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;

/// Sample a scalar animation at local time `t`.
pub fn sample_at(anim: &Anim<f64>, t: Millis) -> PipevizResult<f64> {
    anim.sample(SampleCtx::at(t))
}

/// Start `inner` `by` later.
pub fn delay<T>(inner: Anim<T>, by: Millis) -> Anim<T> {
    Anim::Expr(Expr::Delay {
        inner: Box::new(inner),
        by,
    })
}

/// Repeat `inner` every `period`.
pub fn loop_<T>(inner: Anim<T>, period: Millis) -> Anim<T> {
    Anim::Expr(Expr::Loop {
        inner: Box::new(inner),
        period,
    })
}

/// Single eased segment from `from` to `to` lasting `duration`.
pub fn tween(from: f64, to: f64, duration: Millis, ease: Ease) -> Anim<f64> {
    keys(&[from, to], &[0.0, 1.0], duration, ease)
}

/// Multi-key segment: `values[i]` is reached at `times[i] * duration`.
///
/// `times` are fractions in `[0, 1]`; `ease` applies to every segment.
pub fn keys(values: &[f64], times: &[f64], duration: Millis, ease: Ease) -> Anim<f64> {
    debug_assert_eq!(values.len(), times.len());
    let keys = values
        .iter()
        .zip(times)
        .map(|(&value, &frac)| Keyframe {
            at: Millis((duration.0 as f64 * frac.clamp(0.0, 1.0)).round() as u64),
            value,
            ease,
        })
        .collect();
    Anim::Keyframes(Keyframes {
        keys,
        default: Some(0.0),
    })
}

/// `tween` that waits `after` before starting.
pub fn delayed_tween(from: f64, to: f64, after: Millis, duration: Millis, ease: Ease) -> Anim<f64> {
    delay(tween(from, to, duration, ease), after)
}

/// One copy of `base` per delay, in the order given.
pub fn stagger(base: &Anim<f64>, delays: &[Millis]) -> Vec<Anim<f64>> {
    delays.iter().map(|&d| delay(base.clone(), d)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ops.rs"]
mod tests;
