//! Gulf Stream: RPC nodes forwarding transactions straight to the upcoming leader.
//!
//! There are no discrete states. The single-step cycle is the leader epoch: each completed cycle
//! re-draws the leader, while particles, RPC pings and stake bars free-run on mount time.

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::anim::Anim;
use crate::animation::ease::Ease;
use crate::animation::ops::{delay, delayed_tween, keys, loop_, sample_at, tween};
use crate::foundation::core::Millis;
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::schedule::cycle::{Cycle, CyclePos, Step};
use crate::schedule::machine::{StageScript, StateName};
use crate::stages::catalog::StageId;

/// Displayed stake per candidate validator, in percent.
pub const STAKES_PCT: [f64; 5] = [1.5, 2.0, 3.0, 1.0, 0.5];

const LEADER_EPOCH_MS: u64 = 4000;
const INITIAL_LEADER: usize = 2;
const PARTICLE_PERIOD: Millis = Millis(2500);
const PARTICLE_STAGGER_MS: u64 = 500;
const PING_PERIOD: Millis = Millis(2000);
const PING_STAGGER_MS: u64 = 400;

/// How a new leader is drawn each epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderPolicy {
    /// Every candidate is equally likely, regardless of displayed stake.
    #[default]
    Uniform,
    /// Probability proportional to displayed stake.
    StakeWeighted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GulfStreamState {
    Streaming,
}

impl StateName for GulfStreamState {
    fn name(self) -> &'static str {
        "streaming"
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParticleFrame {
    pub candidate: usize,
    /// Horizontal travel from RPC column to validator column, `0..=1`.
    pub progress: f64,
    pub opacity: f64,
    pub is_leader: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RpcPingFrame {
    pub scale: f64,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ValidatorFrame {
    pub stake_pct: f64,
    /// Width of the stake bar in percent of its track.
    pub bar_width_pct: f64,
    pub is_leader: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GulfStreamFrame {
    pub epoch: u64,
    pub leader: usize,
    pub particles: Vec<ParticleFrame>,
    pub rpc_pings: Vec<RpcPingFrame>,
    pub validators: Vec<ValidatorFrame>,
}

struct Particle {
    progress: Anim<f64>,
    opacity: Anim<f64>,
}

struct Ping {
    scale: Anim<f64>,
    opacity: Anim<f64>,
}

pub struct GulfStreamScript {
    cycle: Cycle<GulfStreamState>,
    seed: u64,
    policy: LeaderPolicy,
    weights: Option<WeightedIndex<f64>>,
    particles: Vec<Particle>,
    pings: Vec<Ping>,
    bars: Vec<Anim<f64>>,
}

impl std::fmt::Debug for GulfStreamScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GulfStreamScript")
            .field("seed", &self.seed)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl GulfStreamScript {
    pub fn new(seed: u64, policy: LeaderPolicy) -> PipevizResult<Self> {
        let cycle = Cycle::new(vec![
            Step::enter(GulfStreamState::Streaming).wait_ms(LEADER_EPOCH_MS),
        ])?;

        let weights = match policy {
            LeaderPolicy::Uniform => None,
            LeaderPolicy::StakeWeighted => Some(
                WeightedIndex::new(STAKES_PCT)
                    .map_err(|e| PipevizError::animation(format!("stake weights: {e}")))?,
            ),
        };

        let particles = (0..STAKES_PCT.len())
            .map(|i| {
                let start = Millis(PARTICLE_STAGGER_MS * i as u64);
                let travel = tween(0.0, 1.0, PARTICLE_PERIOD, Ease::Linear);
                let fade = keys(
                    &[0.0, 1.0, 1.0, 0.0],
                    &[0.0, 0.1, 0.8, 1.0],
                    PARTICLE_PERIOD,
                    Ease::Linear,
                );
                Particle {
                    progress: delay(loop_(travel, PARTICLE_PERIOD), start),
                    opacity: delay(loop_(fade, PARTICLE_PERIOD), start),
                }
            })
            .collect();

        let pings = (0..STAKES_PCT.len())
            .map(|i| {
                let start = Millis(PING_STAGGER_MS * i as u64);
                let scale = tween(1.0, 1.8, PING_PERIOD, Ease::OutQuad);
                let opacity = keys(&[0.0, 0.7, 0.0], &[0.0, 0.5, 1.0], PING_PERIOD, Ease::OutQuad);
                Ping {
                    scale: delay(loop_(scale, PING_PERIOD), start),
                    opacity: delay(loop_(opacity, PING_PERIOD), start),
                }
            })
            .collect();

        let bars = STAKES_PCT
            .iter()
            .enumerate()
            .map(|(i, stake)| {
                delayed_tween(
                    0.0,
                    stake * 20.0,
                    Millis(500 + 100 * i as u64),
                    Millis(1500),
                    Ease::OutCubic,
                )
            })
            .collect();

        Ok(Self {
            cycle,
            seed,
            policy,
            weights,
            particles,
            pings,
            bars,
        })
    }

    /// Leader shown during `epoch`. Deterministic for a given seed.
    pub fn leader_for_epoch(&self, epoch: u64) -> usize {
        if epoch == 0 {
            return INITIAL_LEADER;
        }
        let mut rng = StdRng::seed_from_u64(self.seed ^ epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        match &self.weights {
            Some(w) => w.sample(&mut rng),
            None => rng.random_range(0..STAKES_PCT.len()),
        }
    }
}

impl StageScript for GulfStreamScript {
    type State = GulfStreamState;
    type Frame = GulfStreamFrame;

    const STAGE: StageId = StageId::GulfStream;

    fn cycle(&self) -> &Cycle<GulfStreamState> {
        &self.cycle
    }

    fn render(
        &self,
        pos: &CyclePos<GulfStreamState>,
        elapsed: Millis,
    ) -> PipevizResult<GulfStreamFrame> {
        let epoch = pos.cycle;
        let leader = self.leader_for_epoch(epoch);

        let particles = self
            .particles
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(ParticleFrame {
                    candidate: i,
                    progress: sample_at(&p.progress, elapsed)?,
                    opacity: sample_at(&p.opacity, elapsed)?,
                    is_leader: i == leader,
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        let rpc_pings = self
            .pings
            .iter()
            .map(|p| {
                Ok(RpcPingFrame {
                    scale: sample_at(&p.scale, elapsed)?,
                    opacity: sample_at(&p.opacity, elapsed)?,
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        let validators = STAKES_PCT
            .iter()
            .zip(&self.bars)
            .enumerate()
            .map(|(i, (&stake_pct, bar))| {
                Ok(ValidatorFrame {
                    stake_pct,
                    bar_width_pct: sample_at(bar, elapsed)?,
                    is_leader: i == leader,
                })
            })
            .collect::<PipevizResult<Vec<_>>>()?;

        Ok(GulfStreamFrame {
            epoch,
            leader,
            particles,
            rpc_pings,
            validators,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/gulf_stream.rs"]
mod tests;
