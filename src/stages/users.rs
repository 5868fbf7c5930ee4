//! Users: a wallet alternately sending and signing.

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{keys, sample_at};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::clock::Transition;
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::PathFrame;
use crate::stages::catalog::StageId;

const SEND: Transition = Transition::new("send", 1500);
const SIGN: Transition = Transition::new("sign", 1500);
const RESET: Transition = Transition::instant("reset");

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsersState {
    Send,
    Sign,
    Reset,
}

impl StateName for UsersState {
    fn name(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Sign => "sign",
            Self::Reset => "reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UsersFrame {
    pub state: UsersState,
    /// Wallet -> RPC arrow.
    pub send_arrow: PathFrame,
    /// dApp -> wallet signature request arrow.
    pub sign_arrow: PathFrame,
}

#[derive(Clone, Debug)]
pub struct UsersScript {
    cycle: Cycle<UsersState>,
    opacity: Anim<f64>,
    path_length: Anim<f64>,
}

impl UsersScript {
    pub fn new() -> PipevizResult<Self> {
        let cycle = Cycle::new(vec![
            Step::enter(UsersState::Send).play(SEND).wait_ms(2000),
            Step::enter(UsersState::Sign).play(SIGN).wait_ms(2000),
            Step::enter(UsersState::Reset).play(RESET).wait_ms(1000),
        ])?;
        // Both arrows share one flow shape; only the active one plays it.
        let times = [0.0, 0.6, 0.9, 1.0];
        Ok(Self {
            cycle,
            opacity: keys(&[0.0, 1.0, 1.0, 0.0], &times, SEND.duration, Ease::InOutCubic),
            path_length: keys(&[0.0, 1.0, 1.0, 1.0], &times, SEND.duration, Ease::InOutCubic),
        })
    }

    fn flow(&self, local: Millis) -> PipevizResult<PathFrame> {
        Ok(PathFrame {
            opacity: sample_at(&self.opacity, local)?,
            path_length: sample_at(&self.path_length, local)?,
        })
    }
}

impl StageScript for UsersScript {
    type State = UsersState;
    type Frame = UsersFrame;

    const STAGE: StageId = StageId::Users;

    fn cycle(&self) -> &Cycle<UsersState> {
        &self.cycle
    }

    fn render(&self, pos: &CyclePos<UsersState>, _elapsed: Millis) -> PipevizResult<UsersFrame> {
        let (send_arrow, sign_arrow) = match pos.state {
            UsersState::Send => (self.flow(pos.local)?, PathFrame::HIDDEN),
            UsersState::Sign => (PathFrame::HIDDEN, self.flow(pos.local)?),
            UsersState::Reset => (PathFrame::HIDDEN, PathFrame::HIDDEN),
        };
        Ok(UsersFrame {
            state: pos.state,
            send_arrow,
            sign_arrow,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/users.rs"]
mod tests;
