//! The six per-stage animators and the tagged wrapper the diagram drives them through.

pub mod block_building;
pub mod catalog;
pub mod consensus;
pub mod gulf_stream;
pub mod turbine;
pub mod users;
pub mod verification;

use tokio_util::sync::CancellationToken;

use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::machine::{StageScript, StateName, TimedMachine};

use self::block_building::{BlockBuildingFrame, BlockBuildingScript};
use self::catalog::StageId;
use self::consensus::{ConsensusFrame, ConsensusScript};
use self::gulf_stream::{GulfStreamFrame, GulfStreamScript, LeaderPolicy};
use self::turbine::{TurbineFrame, TurbineScript};
use self::users::{UsersFrame, UsersScript};
use self::verification::{VerificationFrame, VerificationScript};

/// A drawn SVG-style path: how visible it is and how much of it is stroked.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PathFrame {
    pub opacity: f64,
    /// Stroked fraction, `0..=1`.
    pub path_length: f64,
}

impl PathFrame {
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        path_length: 0.0,
    };

    /// Fully opaque path stroked to `path_length`.
    pub fn drawn(path_length: f64) -> Self {
        Self {
            opacity: 1.0,
            path_length,
        }
    }
}

/// Knobs shared by every animator at mount time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationOpts {
    /// Seed for the Gulf Stream leader draw.
    pub seed: u64,
    pub leader_policy: LeaderPolicy,
}

/// Visual values of one stage, tagged by stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "stage", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageFrame {
    Users(UsersFrame),
    GulfStream(GulfStreamFrame),
    BlockBuilding(BlockBuildingFrame),
    Consensus(ConsensusFrame),
    BlockVerification(VerificationFrame),
    Turbine(TurbineFrame),
}

/// One animator's contribution to a scheduler tick.
#[derive(Clone, Debug, serde::Serialize)]
pub struct StageTick {
    pub stage: StageId,
    /// Current state name.
    pub state: &'static str,
    /// Completed cycles since mount.
    pub cycle: u64,
    /// This tick entered `state`.
    pub entered: bool,
    pub frame: StageFrame,
}

/// Any of the six animators behind one type.
#[derive(Debug)]
pub enum StageAnimator {
    Users(TimedMachine<UsersScript>),
    GulfStream(TimedMachine<GulfStreamScript>),
    BlockBuilding(TimedMachine<BlockBuildingScript>),
    Consensus(TimedMachine<ConsensusScript>),
    BlockVerification(TimedMachine<VerificationScript>),
    Turbine(TimedMachine<TurbineScript>),
}

macro_rules! each_machine {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            StageAnimator::Users($m) => $body,
            StageAnimator::GulfStream($m) => $body,
            StageAnimator::BlockBuilding($m) => $body,
            StageAnimator::Consensus($m) => $body,
            StageAnimator::BlockVerification($m) => $body,
            StageAnimator::Turbine($m) => $body,
        }
    };
}

fn tick_machine<S: StageScript>(
    machine: &mut TimedMachine<S>,
    now: Millis,
    wrap: fn(S::Frame) -> StageFrame,
) -> PipevizResult<Option<StageTick>> {
    Ok(machine.tick(now)?.map(|t| StageTick {
        stage: S::STAGE,
        state: t.pos.state.name(),
        cycle: t.pos.cycle,
        entered: t.entered.is_some(),
        frame: wrap(t.frame),
    }))
}

fn entries_of<S: StageScript>(machine: &TimedMachine<S>) -> Vec<(Millis, &'static str)> {
    machine
        .script()
        .cycle()
        .entries()
        .map(|(at, state)| (at, state.name()))
        .collect()
}

impl StageAnimator {
    /// Mount the animator for `id` at `now`, stopping when `stop` fires.
    pub fn mount(
        id: StageId,
        now: Millis,
        stop: CancellationToken,
        opts: AnimationOpts,
    ) -> PipevizResult<Self> {
        Ok(match id {
            StageId::Users => Self::Users(TimedMachine::mount(UsersScript::new()?, now, stop)),
            StageId::GulfStream => Self::GulfStream(TimedMachine::mount(
                GulfStreamScript::new(opts.seed, opts.leader_policy)?,
                now,
                stop,
            )),
            StageId::BlockBuilding => Self::BlockBuilding(TimedMachine::mount(
                BlockBuildingScript::new()?,
                now,
                stop,
            )),
            StageId::Consensus => {
                Self::Consensus(TimedMachine::mount(ConsensusScript::new()?, now, stop))
            }
            StageId::BlockVerification => Self::BlockVerification(TimedMachine::mount(
                VerificationScript::new()?,
                now,
                stop,
            )),
            StageId::Turbine => Self::Turbine(TimedMachine::mount(TurbineScript::new()?, now, stop)),
        })
    }

    pub fn stage(&self) -> StageId {
        match self {
            Self::Users(_) => StageId::Users,
            Self::GulfStream(_) => StageId::GulfStream,
            Self::BlockBuilding(_) => StageId::BlockBuilding,
            Self::Consensus(_) => StageId::Consensus,
            Self::BlockVerification(_) => StageId::BlockVerification,
            Self::Turbine(_) => StageId::Turbine,
        }
    }

    /// Advance to `now`; `None` once stopped.
    pub fn tick(&mut self, now: Millis) -> PipevizResult<Option<StageTick>> {
        match self {
            Self::Users(m) => tick_machine(m, now, StageFrame::Users),
            Self::GulfStream(m) => tick_machine(m, now, StageFrame::GulfStream),
            Self::BlockBuilding(m) => tick_machine(m, now, StageFrame::BlockBuilding),
            Self::Consensus(m) => tick_machine(m, now, StageFrame::Consensus),
            Self::BlockVerification(m) => tick_machine(m, now, StageFrame::BlockVerification),
            Self::Turbine(m) => tick_machine(m, now, StageFrame::Turbine),
        }
    }

    /// Entered states over one cycle, with their offsets.
    pub fn entries(&self) -> Vec<(Millis, &'static str)> {
        each_machine!(self, m => entries_of(m))
    }

    /// Length of one cycle.
    pub fn period(&self) -> Millis {
        each_machine!(self, m => m.script().cycle().period())
    }

    pub fn is_stopped(&self) -> bool {
        each_machine!(self, m => m.is_stopped())
    }

    pub fn stop(&self) {
        each_machine!(self, m => m.stop())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/mod.rs"]
mod tests;
