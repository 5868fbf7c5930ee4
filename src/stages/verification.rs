//! Block verification: replay, retransmit and shred checks light up hop by hop.

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{delayed_tween, keys, loop_, sample_at, tween};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::clock::Transition;
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::catalog::StageId;

const FLOW: Transition = Transition::new("flow", 2400);
const RESET: Transition = Transition::instant("reset");
const HOP_REVEAL: Millis = Millis(400);
const SHRED_LOOP: Millis = Millis(4000);

/// Pipeline hops in reveal order: `(from, to, delay)`.
pub const HOPS: [(&str, &str, Millis); 3] = [
    ("replay", "retransmit", Millis(1000)),
    ("retransmit", "shred_verify", Millis(1500)),
    ("shred_verify", "shred_fetch", Millis(2000)),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyState {
    Flow,
    Reset,
}

impl StateName for VerifyState {
    fn name(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Reset => "reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HopFrame {
    pub from: &'static str,
    pub to: &'static str,
    pub opacity: f64,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShredIndicator {
    pub opacity: f64,
    /// Fall from above the box (`0`) to inside it (`1`).
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VerificationFrame {
    pub state: VerifyState,
    pub hops: Vec<HopFrame>,
    pub shred: ShredIndicator,
}

#[derive(Clone, Debug)]
pub struct VerificationScript {
    cycle: Cycle<VerifyState>,
    reveals: Vec<Anim<f64>>,
    shred_opacity: Anim<f64>,
    shred_y: Anim<f64>,
}

impl VerificationScript {
    pub fn new() -> PipevizResult<Self> {
        let cycle = Cycle::new(vec![
            Step::enter(VerifyState::Flow).play(FLOW).wait_ms(4000),
            Step::enter(VerifyState::Reset).play(RESET).wait_ms(500),
        ])?;
        let fade = keys(
            &[0.0, 1.0, 1.0, 0.0],
            &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0],
            SHRED_LOOP,
            Ease::Linear,
        );
        Ok(Self {
            cycle,
            reveals: HOPS
                .iter()
                .map(|&(_, _, after)| delayed_tween(0.0, 1.0, after, HOP_REVEAL, Ease::OutQuad))
                .collect(),
            shred_opacity: loop_(fade, SHRED_LOOP),
            shred_y: loop_(tween(0.0, 1.0, SHRED_LOOP, Ease::Linear), SHRED_LOOP),
        })
    }
}

impl StageScript for VerificationScript {
    type State = VerifyState;
    type Frame = VerificationFrame;

    const STAGE: StageId = StageId::BlockVerification;

    fn cycle(&self) -> &Cycle<VerifyState> {
        &self.cycle
    }

    fn render(
        &self,
        pos: &CyclePos<VerifyState>,
        elapsed: Millis,
    ) -> PipevizResult<VerificationFrame> {
        let hops = HOPS
            .iter()
            .zip(&self.reveals)
            .map(|(&(from, to, _), reveal)| {
                let v = match pos.state {
                    VerifyState::Flow => sample_at(reveal, pos.local)?,
                    VerifyState::Reset => 0.0,
                };
                Ok(HopFrame {
                    from,
                    to,
                    opacity: v,
                    scale: v,
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        // The indicator ignores the cycle and runs off mount time.
        let shred = ShredIndicator {
            opacity: sample_at(&self.shred_opacity, elapsed)?,
            y: sample_at(&self.shred_y, elapsed)?,
        };

        Ok(VerificationFrame {
            state: pos.state,
            hops,
            shred,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/verification.rs"]
mod tests;
