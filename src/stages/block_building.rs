//! Block building: fetch, bank four entries, tick PoH, shred, write to the ledger.

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{keys, sample_at, stagger, tween};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::clock::Transition;
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::catalog::StageId;

/// Banking slots filled per block.
pub const BANK_SLOTS: usize = 4;

const FETCH: Transition = Transition::new("fetch", 500);
const DOT_MOVE: Transition = Transition::new("dot_move", 300);
const POH: Transition = Transition::new("poh", 1000);
// Four fragments of 1000ms each, staggered by 150ms.
const SHRED: Transition = Transition::new("shred", 1450);
const WRITE_DB: Transition = Transition::new("write_db", 800);
const RESET: Transition = Transition::instant("reset");

const FIRST_BANKING_STEP: usize = 2;
const DOT_TOP: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Idle,
    Fetching,
    Banking,
    Processing,
    Shredding,
    Writing,
    Resetting,
}

impl StateName for BuildState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Banking => "banking",
            Self::Processing => "processing",
            Self::Shredding => "shredding",
            Self::Writing => "writing",
            Self::Resetting => "resetting",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DotFrame {
    /// Vertical position in the fetch lane, `0` = top.
    pub y: f64,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShredFrame {
    pub opacity: f64,
    /// Travel toward the broadcast column, `0..=1`.
    pub travel: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BlockBuildingFrame {
    pub state: BuildState,
    pub filled_slots: usize,
    /// Fetch -> sig-verify line growth, `0..=1`.
    pub fetch_line: f64,
    pub dot: DotFrame,
    pub entry_opacity: f64,
    pub poh_scale: f64,
    pub shreds: Vec<ShredFrame>,
    pub db_arrow_opacity: f64,
}

#[derive(Clone, Debug)]
pub struct BlockBuildingScript {
    cycle: Cycle<BuildState>,
    fetch_line: Anim<f64>,
    poh_scale: Anim<f64>,
    entry_fade: Anim<f64>,
    shred_opacity: Vec<Anim<f64>>,
    shred_travel: Vec<Anim<f64>>,
    db_arrow: Anim<f64>,
}

/// Lane position of bank slot `i`.
fn slot_y(i: usize) -> f64 {
    0.23 + 0.18 * i as f64
}

impl BlockBuildingScript {
    pub fn new() -> PipevizResult<Self> {
        let mut steps = vec![
            Step::enter(BuildState::Idle).wait_ms(1500),
            Step::enter(BuildState::Fetching).play(FETCH).wait_ms(500),
        ];
        for slot in 0..BANK_SLOTS {
            let fill = Step::enter(BuildState::Banking).play(DOT_MOVE);
            steps.push(if slot + 1 == BANK_SLOTS {
                fill.wait_ms(300)
            } else {
                fill
            });
        }
        steps.extend([
            Step::enter(BuildState::Processing).play(POH).wait_ms(1000),
            Step::enter(BuildState::Shredding).play(SHRED).wait_ms(1500),
            Step::enter(BuildState::Writing).play(WRITE_DB).wait_ms(1000),
            Step::enter(BuildState::Resetting).play(RESET).wait_ms(500),
        ]);

        let fragment = Millis(1000);
        let delays: Vec<_> = (0..BANK_SLOTS).map(|i| Millis(150 * i as u64)).collect();
        let shred_opacity = stagger(
            &keys(&[0.0, 1.0, 1.0, 0.0], &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0], fragment, Ease::OutCubic),
            &delays,
        );
        let shred_travel = stagger(&tween(0.0, 1.0, fragment, Ease::OutCubic), &delays);

        Ok(Self {
            cycle: Cycle::new(steps)?,
            fetch_line: tween(0.0, 1.0, FETCH.duration, Ease::OutCubic),
            poh_scale: keys(&[1.0, 1.2, 1.0], &[0.0, 0.5, 1.0], POH.duration, Ease::Linear),
            entry_fade: tween(1.0, 0.0, Millis(200), Ease::Linear),
            shred_opacity,
            shred_travel,
            db_arrow: keys(&[0.2, 1.0, 0.2], &[0.0, 0.5, 1.0], WRITE_DB.duration, Ease::InOutCubic),
        })
    }

    /// Slots filled at `pos`. A slot counts once its dot move completes; `resetting` empties
    /// the bank before `idle` is re-entered.
    pub fn filled_slots(pos: &CyclePos<BuildState>) -> usize {
        match pos.state {
            BuildState::Idle | BuildState::Fetching | BuildState::Resetting => 0,
            BuildState::Banking => {
                let slot = pos.step - FIRST_BANKING_STEP;
                if pos.local >= DOT_MOVE.duration {
                    slot + 1
                } else {
                    slot
                }
            }
            BuildState::Processing | BuildState::Shredding | BuildState::Writing => BANK_SLOTS,
        }
    }

    fn dot(&self, pos: &CyclePos<BuildState>) -> DotFrame {
        match pos.state {
            BuildState::Fetching => DotFrame {
                y: DOT_TOP,
                opacity: 1.0,
            },
            BuildState::Banking => {
                let slot = pos.step - FIRST_BANKING_STEP;
                let from = if slot == 0 { DOT_TOP } else { slot_y(slot - 1) };
                let t = pos.local.progress_in(DOT_MOVE.duration);
                DotFrame {
                    y: from + (slot_y(slot) - from) * t,
                    opacity: 1.0,
                }
            }
            _ => DotFrame {
                y: DOT_TOP,
                opacity: 0.0,
            },
        }
    }
}

impl StageScript for BlockBuildingScript {
    type State = BuildState;
    type Frame = BlockBuildingFrame;

    const STAGE: StageId = StageId::BlockBuilding;

    fn cycle(&self) -> &Cycle<BuildState> {
        &self.cycle
    }

    fn render(
        &self,
        pos: &CyclePos<BuildState>,
        _elapsed: Millis,
    ) -> PipevizResult<BlockBuildingFrame> {
        let local = pos.local;
        let fetch_line = match pos.state {
            BuildState::Idle | BuildState::Resetting => 0.0,
            BuildState::Fetching => sample_at(&self.fetch_line, local)?,
            _ => 1.0,
        };
        let entry_opacity = match pos.state {
            BuildState::Shredding => sample_at(&self.entry_fade, local)?,
            BuildState::Writing => 0.0,
            _ => 1.0,
        };
        let poh_scale = match pos.state {
            BuildState::Processing => sample_at(&self.poh_scale, local)?,
            _ => 1.0,
        };
        let shreds = if pos.state == BuildState::Shredding {
            self.shred_opacity
                .iter()
                .zip(&self.shred_travel)
                .map(|(o, t)| {
                    Ok(ShredFrame {
                        opacity: sample_at(o, local)?,
                        travel: sample_at(t, local)?,
                    })
                })
                .collect::<PipevizResult<Vec<_>>>()?
        } else {
            vec![
                ShredFrame {
                    opacity: 0.0,
                    travel: 0.0,
                };
                BANK_SLOTS
            ]
        };
        let db_arrow_opacity = match pos.state {
            BuildState::Writing => sample_at(&self.db_arrow, local)?,
            _ => 0.2,
        };

        Ok(BlockBuildingFrame {
            state: pos.state,
            filled_slots: Self::filled_slots(pos),
            fetch_line,
            dot: self.dot(pos),
            entry_opacity,
            poh_scale,
            shreds,
            db_arrow_opacity,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/block_building.rs"]
mod tests;
