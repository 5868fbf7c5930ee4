//! Consensus: a small fork graph grows, resolves to one rooted chain, then clears.

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{delay, delayed_tween, keys, loop_, sample_at, tween};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::PathFrame;
use crate::stages::catalog::StageId;

/// A block in the static fork layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BlockSpec {
    pub id: u8,
    pub slot: u8,
    pub pruned: bool,
    pub rooted: bool,
}

/// A parent -> child link and the delay before it draws in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EdgeSpec {
    pub from: u8,
    pub to: u8,
    pub delay: Millis,
}

const fn block(id: u8, pruned: bool, rooted: bool) -> BlockSpec {
    BlockSpec {
        id,
        slot: id,
        pruned,
        rooted,
    }
}

/// One block per slot; blocks 1, 2 and 4 lose the fork and block 5 becomes the root.
pub const BLOCKS: [BlockSpec; 6] = [
    block(0, false, false),
    block(1, true, false),
    block(2, true, false),
    block(3, false, false),
    block(4, true, false),
    block(5, false, true),
];

pub const EDGES: [EdgeSpec; 5] = [
    EdgeSpec {
        from: 0,
        to: 1,
        delay: Millis(500),
    },
    EdgeSpec {
        from: 1,
        to: 2,
        delay: Millis(700),
    },
    EdgeSpec {
        from: 0,
        to: 3,
        delay: Millis(900),
    },
    EdgeSpec {
        from: 3,
        to: 4,
        delay: Millis(1100),
    },
    EdgeSpec {
        from: 3,
        to: 5,
        delay: Millis(1300),
    },
];

const PRUNED_OPACITY: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusState {
    Idle,
    Building,
    Resolving,
    Resetting,
}

impl StateName for ConsensusState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Resolving => "resolving",
            Self::Resetting => "resetting",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BlockFrame {
    #[serde(flatten)]
    pub spec: BlockSpec,
    pub opacity: f64,
    pub scale: f64,
    /// Glow radius in px; only the rooted block pulses.
    pub glow: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EdgeFrame {
    pub from: u8,
    pub to: u8,
    #[serde(flatten)]
    pub path: PathFrame,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConsensusFrame {
    pub state: ConsensusState,
    pub blocks: Vec<BlockFrame>,
    pub edges: Vec<EdgeFrame>,
    /// Opacity of the "pruned" / "rooted" captions.
    pub label_opacity: f64,
}

#[derive(Clone, Debug)]
pub struct ConsensusScript {
    cycle: Cycle<ConsensusState>,
    appear: Anim<f64>,
    grow: Anim<f64>,
    prune_fade: Anim<f64>,
    prune_shrink: Anim<f64>,
    root_pulse: Anim<f64>,
    edge_grow: Vec<Anim<f64>>,
    labels_in: Anim<f64>,
}

impl ConsensusScript {
    pub fn new() -> PipevizResult<Self> {
        let cycle = Cycle::new(vec![
            Step::enter(ConsensusState::Idle).wait_ms(2000),
            Step::enter(ConsensusState::Building).wait_ms(2500),
            Step::enter(ConsensusState::Resolving).wait_ms(4000),
            Step::enter(ConsensusState::Resetting).wait_ms(1000),
        ])?;

        let pulse = keys(&[0.0, 10.0, 0.0], &[0.0, 0.5, 1.0], Millis(1500), Ease::InOutQuad);
        Ok(Self {
            cycle,
            appear: tween(0.0, 1.0, Millis(400), Ease::OutQuad),
            grow: tween(0.8, 1.0, Millis(400), Ease::OutQuad),
            prune_fade: delayed_tween(1.0, PRUNED_OPACITY, Millis(200), Millis(500), Ease::OutQuad),
            prune_shrink: delayed_tween(1.0, 0.95, Millis(200), Millis(500), Ease::OutQuad),
            root_pulse: delay(loop_(pulse, Millis(1500)), Millis(500)),
            edge_grow: EDGES
                .iter()
                .map(|e| delayed_tween(0.0, 1.0, e.delay, Millis(500), Ease::InOutCubic))
                .collect(),
            labels_in: delayed_tween(0.0, 1.0, Millis(800), Millis(500), Ease::OutQuad),
        })
    }

    fn block(&self, spec: BlockSpec, pos: &CyclePos<ConsensusState>) -> PipevizResult<BlockFrame> {
        let t = pos.local;
        let settled = if spec.pruned { PRUNED_OPACITY } else { 1.0 };
        let (opacity, scale, glow) = match pos.state {
            ConsensusState::Idle => (0.0, 0.8, 0.0),
            ConsensusState::Building => (sample_at(&self.appear, t)?, sample_at(&self.grow, t)?, 0.0),
            ConsensusState::Resolving if spec.pruned => (
                sample_at(&self.prune_fade, t)?,
                sample_at(&self.prune_shrink, t)?,
                0.0,
            ),
            ConsensusState::Resolving => {
                let glow = if spec.rooted {
                    sample_at(&self.root_pulse, t)?
                } else {
                    0.0
                };
                (1.0, 1.0, glow)
            }
            ConsensusState::Resetting => {
                let fade = 1.0 - t.progress_in(Millis(300));
                let scale = if spec.pruned { 0.95 } else { 1.0 };
                (settled * fade, scale, 0.0)
            }
        };
        Ok(BlockFrame {
            spec,
            opacity,
            scale,
            glow,
        })
    }
}

impl StageScript for ConsensusScript {
    type State = ConsensusState;
    type Frame = ConsensusFrame;

    const STAGE: StageId = StageId::Consensus;

    fn cycle(&self) -> &Cycle<ConsensusState> {
        &self.cycle
    }

    fn render(
        &self,
        pos: &CyclePos<ConsensusState>,
        _elapsed: Millis,
    ) -> PipevizResult<ConsensusFrame> {
        let t = pos.local;
        let blocks = BLOCKS
            .iter()
            .map(|b| self.block(*b, pos))
            .collect::<PipevizResult<Vec<_>>>()?;

        let edges = EDGES
            .iter()
            .zip(&self.edge_grow)
            .map(|(e, grow)| {
                let length = match pos.state {
                    ConsensusState::Idle => 0.0,
                    ConsensusState::Building => sample_at(grow, t)?,
                    ConsensusState::Resolving => 1.0,
                    ConsensusState::Resetting => 1.0 - t.progress_in(Millis(300)),
                };
                Ok(EdgeFrame {
                    from: e.from,
                    to: e.to,
                    path: PathFrame::drawn(length),
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        let label_opacity = match pos.state {
            ConsensusState::Resolving => sample_at(&self.labels_in, t)?,
            ConsensusState::Resetting => 1.0 - t.progress_in(Millis(200)),
            _ => 0.0,
        };

        Ok(ConsensusFrame {
            state: pos.state,
            blocks,
            edges,
            label_opacity,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/consensus.rs"]
mod tests;
