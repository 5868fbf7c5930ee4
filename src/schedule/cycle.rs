use crate::foundation::core::Millis;
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::schedule::clock::Transition;

/// One row of a transition table: enter `state`, play `transition` (if any), then hold.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<S> {
    /// State entered at the start of this step.
    pub state: S,
    /// Transition played on entry.
    pub transition: Option<Transition>,
    /// Hold after the transition completes.
    pub hold: Millis,
}

impl<S> Step<S> {
    /// Enter `state` with no transition and no hold.
    pub fn enter(state: S) -> Self {
        Self {
            state,
            transition: None,
            hold: Millis::ZERO,
        }
    }

    /// Play `transition` to completion on entry.
    pub fn play(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Hold for `ms` more milliseconds.
    pub fn wait_ms(mut self, ms: u64) -> Self {
        self.hold = self.hold.plus(Millis(ms));
        self
    }

    /// Total time spent in this step.
    pub fn duration(&self) -> Millis {
        self.transition
            .map_or(Millis::ZERO, |t| t.duration)
            .plus(self.hold)
    }
}

/// Where inside a step the timeline currently is.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Playing the step's transition.
    Transition {
        /// Transition name.
        name: &'static str,
        /// Linear progress in `[0, 1)`.
        progress: f64,
    },
    /// Holding after the transition.
    Hold {
        /// Time left in the hold.
        remaining: Millis,
    },
}

/// Result of locating an elapsed time inside a looping cycle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CyclePos<S> {
    /// Completed cycles before this one.
    pub cycle: u64,
    /// Index of the active step.
    pub step: usize,
    /// State of the active step.
    pub state: S,
    /// Time since the active step was entered.
    pub local: Millis,
    /// Transition or hold.
    pub phase: Phase,
}

/// A looping, time-triggered transition table.
#[derive(Clone, Debug)]
pub struct Cycle<S> {
    steps: Vec<Step<S>>,
    starts: Vec<Millis>,
    period: Millis,
}

impl<S: Copy> Cycle<S> {
    /// Build a cycle; it must contain at least one step and take a non-zero time overall.
    pub fn new(steps: Vec<Step<S>>) -> PipevizResult<Self> {
        if steps.is_empty() {
            return Err(PipevizError::animation("cycle must have at least one step"));
        }

        let mut starts = Vec::with_capacity(steps.len());
        let mut t = Millis::ZERO;
        for step in &steps {
            starts.push(t);
            t = t.plus(step.duration());
        }
        if t == Millis::ZERO {
            return Err(PipevizError::animation("cycle period must be > 0"));
        }

        Ok(Self {
            steps,
            starts,
            period: t,
        })
    }

    /// Length of one full cycle.
    pub fn period(&self) -> Millis {
        self.period
    }

    /// `(offset, state)` for every step entered during one cycle, in order.
    pub fn entries(&self) -> impl Iterator<Item = (Millis, S)> + '_ {
        self.starts
            .iter()
            .zip(&self.steps)
            .map(|(&at, step)| (at, step.state))
    }

    /// Locate `elapsed` (time since mount) in the cycle.
    pub fn locate(&self, elapsed: Millis) -> CyclePos<S> {
        let cycle = elapsed.0 / self.period.0;
        let within = Millis(elapsed.0 % self.period.0);
        // Zero-length steps share their start with the next step and are skipped here.
        let idx = self.starts.partition_point(|&s| s <= within) - 1;
        let step = &self.steps[idx];
        let local = within.since(self.starts[idx]);

        let phase = match step.transition {
            Some(t) if local < t.duration => Phase::Transition {
                name: t.name,
                progress: local.progress_in(t.duration),
            },
            _ => Phase::Hold {
                remaining: step.duration().since(local),
            },
        };

        CyclePos {
            cycle,
            step: idx,
            state: step.state,
            local,
            phase,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/cycle.rs"]
mod tests;
