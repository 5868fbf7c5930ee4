use std::fmt::Debug;

use tokio_util::sync::CancellationToken;

use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::cycle::{Cycle, CyclePos};
use crate::stages::catalog::StageId;

/// Stable lowercase name of an animator state.
pub trait StateName: Copy {
    /// Name as shown in logs and timelines.
    fn name(self) -> &'static str;
}

/// Per-stage strategy plugged into the generic [`TimedMachine`]: a transition table plus a
/// rendering hook that turns a cycle position into visual values.
pub trait StageScript {
    /// The stage's private, finite state set.
    type State: StateName + Eq + Debug + serde::Serialize;
    /// Visual values consumed by a rendering layer.
    type Frame: Clone + Debug + serde::Serialize;

    /// Stage this script animates.
    const STAGE: StageId;

    /// The looping transition table.
    fn cycle(&self) -> &Cycle<Self::State>;

    /// Visual values at `pos`. `elapsed` is the time since mount, for free-running effects that
    /// ignore the cycle.
    fn render(&self, pos: &CyclePos<Self::State>, elapsed: Millis) -> PipevizResult<Self::Frame>;
}

/// One scheduler tick's worth of output from a machine.
#[derive(Clone, Debug, serde::Serialize)]
pub struct MachineTick<S, F> {
    /// Time since mount.
    pub elapsed: Millis,
    /// Position inside the cycle.
    pub pos: CyclePos<S>,
    /// Sampled visual values.
    pub frame: F,
    /// Set when this tick observed a different step than the previous one.
    pub entered: Option<S>,
}

/// Independent, cancellable timed state machine. State is a pure function of elapsed time; the
/// machine only remembers which step it last reported so entries can be logged.
#[derive(Debug)]
pub struct TimedMachine<S: StageScript> {
    script: S,
    mounted_at: Millis,
    stop: CancellationToken,
    last_step: Option<(u64, usize)>,
}

impl<S: StageScript> TimedMachine<S> {
    /// Mount `script` at `now`. Cancelling `stop` halts the machine.
    pub fn mount(script: S, now: Millis, stop: CancellationToken) -> Self {
        tracing::debug!(stage = %S::STAGE, at = %now, "animator mounted");
        Self {
            script,
            mounted_at: now,
            stop,
            last_step: None,
        }
    }

    /// The underlying script.
    pub fn script(&self) -> &S {
        &self.script
    }

    /// Return `true` once the stop signal has fired.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Fire this machine's stop signal.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Cycle position at `now`.
    pub fn position(&self, now: Millis) -> CyclePos<S::State> {
        self.script.cycle().locate(now.since(self.mounted_at))
    }

    /// Advance to `now`. Returns `None` once stopped; no further work is scheduled after that.
    pub fn tick(&mut self, now: Millis) -> PipevizResult<Option<MachineTick<S::State, S::Frame>>> {
        if self.is_stopped() {
            return Ok(None);
        }

        let elapsed = now.since(self.mounted_at);
        let pos = self.position(now);
        let key = (pos.cycle, pos.step);
        let entered = (self.last_step != Some(key)).then_some(pos.state);
        if let Some(state) = entered {
            tracing::debug!(
                stage = %S::STAGE,
                state = state.name(),
                cycle = pos.cycle,
                at = %elapsed,
                "entered state"
            );
        }
        self.last_step = Some(key);

        let frame = self.script.render(&pos, elapsed)?;
        Ok(Some(MachineTick {
            elapsed,
            pos,
            frame,
            entered,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/machine.rs"]
mod tests;
