use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::diagram::controller::{DiagramController, DiagramFrame};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::schedule::clock::Clock;
use crate::stages::catalog::StageId;

/// Scheduler loop settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DriveOpts {
    /// Time between scheduler ticks.
    pub tick_ms: u64,
    /// Stop on its own once the clock reaches this. `None` runs until teardown.
    pub max_duration_ms: Option<u64>,
}

impl Default for DriveOpts {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            max_duration_ms: None,
        }
    }
}

impl DriveOpts {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// What a drive loop did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DriveStats {
    pub frames: u64,
    /// Clicks that started a request.
    pub requests: u64,
    /// Clock reading when the loop exited.
    pub ended_at: Millis,
}

/// Tick `controller` on a fixed interval until it is torn down or `max_duration_ms` passes.
///
/// Stage clicks arriving on `clicks` are applied between ticks and their requests run as
/// separate tasks, so the animators keep looping while an explanation loads. Requests still in
/// flight when the loop exits are abandoned. Teardown is observed at every await point, so no
/// tick runs after the stop token fires.
pub async fn drive<C, F>(
    controller: &mut DiagramController,
    clock: &C,
    opts: DriveOpts,
    mut clicks: mpsc::Receiver<StageId>,
    mut on_frame: F,
) -> PipevizResult<DriveStats>
where
    C: Clock + ?Sized,
    F: FnMut(DiagramFrame),
{
    let stop = controller.stop_token();
    let limit = opts.max_duration_ms.map(Millis);
    let mut interval = tokio::time::interval(opts.tick());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut requests = JoinSet::new();
    let mut clicks_open = true;
    let mut stats = DriveStats::default();
    tracing::debug!(tick_ms = opts.tick_ms, ?limit, "drive loop started");
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            click = clicks.recv(), if clicks_open => match click {
                Some(stage) => {
                    if let Some(pending) = controller.select_stage(stage) {
                        stats.requests += 1;
                        requests.spawn(pending.resolve());
                    }
                }
                None => clicks_open = false,
            },
            Some(_) = requests.join_next(), if !requests.is_empty() => {}
            _ = interval.tick() => {
                let now = clock.now();
                stats.ended_at = now;
                if limit.is_some_and(|l| now >= l) {
                    break;
                }
                match controller.tick(now)? {
                    Some(frame) => {
                        stats.frames += 1;
                        on_frame(frame);
                    }
                    None => break,
                }
            }
        }
    }
    tracing::debug!(
        frames = stats.frames,
        requests = stats.requests,
        at = %stats.ended_at,
        "drive loop finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/diagram/driver.rs"]
mod tests;
