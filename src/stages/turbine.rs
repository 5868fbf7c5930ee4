//! Turbine: the leader fans shreds out through a layered tree of validators.

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{delayed_tween, sample_at};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::clock::Transition;
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::PathFrame;
use crate::stages::catalog::StageId;

// Longest reveal: the second leaf starts at 1800 and takes 500.
const VISIBLE: Transition = Transition::new("visible", 2300);
const HIDDEN: Transition = Transition::instant("hidden");
const NODE_REVEAL: Millis = Millis(500);
const EDGE_REVEAL: Millis = Millis(400);

/// A node in the fan-out tree. `layer` 0 is the leader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NodeSpec {
    pub id: u8,
    pub layer: u8,
    pub delay: Millis,
}

const fn node(id: u8, layer: u8, delay: u64) -> NodeSpec {
    NodeSpec {
        id,
        layer,
        delay: Millis(delay),
    }
}

pub const NODES: [NodeSpec; 14] = [
    node(0, 0, 800),
    node(1, 1, 1000),
    node(2, 1, 1100),
    node(3, 1, 1200),
    node(4, 2, 1300),
    node(5, 2, 1350),
    node(6, 2, 1400),
    node(7, 2, 1450),
    node(8, 2, 1500),
    node(9, 2, 1550),
    node(10, 2, 1600),
    node(11, 2, 1650),
    node(12, 3, 1700),
    node(13, 3, 1800),
];

/// `(parent, child, delay)`. Not every lower node is wired; the tree is illustrative.
pub const EDGES: [(u8, u8, Millis); 11] = [
    (0, 1, Millis(1000)),
    (0, 2, Millis(1100)),
    (0, 3, Millis(1200)),
    (1, 4, Millis(1300)),
    (1, 5, Millis(1300)),
    (2, 7, Millis(1400)),
    (2, 8, Millis(1400)),
    (3, 10, Millis(1500)),
    (3, 11, Millis(1500)),
    (4, 12, Millis(1700)),
    (4, 13, Millis(1700)),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbineState {
    Visible,
    Hidden,
}

impl StateName for TurbineState {
    fn name(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeFrame {
    pub id: u8,
    pub layer: u8,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LinkFrame {
    pub parent: u8,
    pub child: u8,
    #[serde(flatten)]
    pub path: PathFrame,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TurbineFrame {
    pub state: TurbineState,
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
    /// Shred dropping onto the leader, `0` = off-screen.
    pub shred: f64,
}

#[derive(Clone, Debug)]
pub struct TurbineScript {
    cycle: Cycle<TurbineState>,
    nodes: Vec<Anim<f64>>,
    links: Vec<Anim<f64>>,
    shred: Anim<f64>,
}

impl TurbineScript {
    pub fn new() -> PipevizResult<Self> {
        let cycle = Cycle::new(vec![
            Step::enter(TurbineState::Visible).play(VISIBLE).wait_ms(4000),
            Step::enter(TurbineState::Hidden).play(HIDDEN).wait_ms(1000),
        ])?;
        Ok(Self {
            cycle,
            nodes: NODES
                .iter()
                .map(|n| delayed_tween(0.0, 1.0, n.delay, NODE_REVEAL, Ease::OutCubic))
                .collect(),
            links: EDGES
                .iter()
                .map(|&(_, _, after)| delayed_tween(0.0, 1.0, after, EDGE_REVEAL, Ease::InOutCubic))
                .collect(),
            shred: delayed_tween(0.0, 1.0, Millis(500), Millis(500), Ease::OutQuad),
        })
    }
}

impl StageScript for TurbineScript {
    type State = TurbineState;
    type Frame = TurbineFrame;

    const STAGE: StageId = StageId::Turbine;

    fn cycle(&self) -> &Cycle<TurbineState> {
        &self.cycle
    }

    fn render(&self, pos: &CyclePos<TurbineState>, _elapsed: Millis) -> PipevizResult<TurbineFrame> {
        let visible = pos.state == TurbineState::Visible;
        let at = |anim: &Anim<f64>| -> PipevizResult<f64> {
            if visible {
                sample_at(anim, pos.local)
            } else {
                Ok(0.0)
            }
        };

        let nodes = NODES
            .iter()
            .zip(&self.nodes)
            .map(|(n, anim)| {
                Ok(NodeFrame {
                    id: n.id,
                    layer: n.layer,
                    scale: at(anim)?,
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        let links = EDGES
            .iter()
            .zip(&self.links)
            .map(|(&(parent, child, _), anim)| {
                Ok(LinkFrame {
                    parent,
                    child,
                    path: PathFrame::drawn(at(anim)?),
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        Ok(TurbineFrame {
            state: pos.state,
            nodes,
            links,
            shred: at(&self.shred)?,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/turbine.rs"]
mod tests;
