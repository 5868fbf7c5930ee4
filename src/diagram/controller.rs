use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::explain::display::PanelView;
use crate::explain::flow::{ExplanationRequestFlow, PendingRequest, RequestOutcome};
use crate::foundation::core::Millis;
use crate::foundation::error::PipevizResult;
use crate::stages::catalog::StageId;
use crate::stages::{AnimationOpts, StageAnimator, StageTick};

/// One stage as the rendering layer sees it on a given tick.
#[derive(Clone, Debug, serde::Serialize)]
pub struct StageView {
    pub title: &'static str,
    pub description: &'static str,
    pub slot: &'static str,
    pub selected: bool,
    /// Selected and waiting on its explanation.
    pub loading: bool,
    #[serde(flatten)]
    pub tick: StageTick,
}

/// Everything the diagram and panel need for one tick.
#[derive(Clone, Debug, serde::Serialize)]
pub struct DiagramFrame {
    pub at: Millis,
    pub selected: Option<StageId>,
    pub stages: Vec<StageView>,
    pub panel: PanelView,
}

/// Owns the six animators, the selection and the explanation flow.
///
/// Every animator holds a child of the controller's cancellation token, so [`teardown`] stops
/// them all at once.
///
/// [`teardown`]: DiagramController::teardown
#[derive(Debug)]
pub struct DiagramController {
    animators: Vec<StageAnimator>,
    selected: Option<StageId>,
    flow: ExplanationRequestFlow,
    stop: CancellationToken,
}

impl DiagramController {
    /// Mount every stage at `now`.
    pub fn mount(flow: ExplanationRequestFlow, now: Millis, opts: AnimationOpts) -> PipevizResult<Self> {
        let stop = CancellationToken::new();
        let animators = StageId::ALL
            .into_iter()
            .map(|id| StageAnimator::mount(id, now, stop.child_token(), opts))
            .collect::<PipevizResult<Vec<_>>>()?;
        tracing::info!(at = %now, stages = animators.len(), "diagram mounted");
        Ok(Self {
            animators,
            selected: None,
            flow,
            stop,
        })
    }

    pub fn selected(&self) -> Option<StageId> {
        self.selected
    }

    /// `true` while the selected stage's request is in flight.
    pub fn is_loading(&self) -> bool {
        self.selected.is_some_and(|s| self.flow.is_loading(s))
    }

    pub fn outcome(&self) -> RequestOutcome {
        self.flow.outcome()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestOutcome> {
        self.flow.subscribe()
    }

    pub fn flow(&self) -> &ExplanationRequestFlow {
        &self.flow
    }

    pub fn animators(&self) -> &[StageAnimator] {
        &self.animators
    }

    /// Token that fires on [`DiagramController::teardown`].
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Handle a click on `stage`.
    ///
    /// Returns the request to resolve, or `None` when the click is ignored: the same stage is
    /// already loading, or the diagram is torn down. Selecting another stage while one is
    /// loading supersedes the earlier request.
    pub fn select_stage(&mut self, stage: StageId) -> Option<PendingRequest> {
        if self.is_torn_down() {
            return None;
        }
        if self.selected == Some(stage) && self.flow.is_loading(stage) {
            tracing::debug!(%stage, "click ignored, request already in flight");
            return None;
        }
        if let Some(previous) = self.selected.filter(|p| *p != stage) {
            tracing::debug!(%previous, %stage, "selection switched");
        }
        self.selected = Some(stage);
        Some(self.flow.begin(stage))
    }

    /// Current panel content.
    pub fn panel(&self) -> PanelView {
        PanelView::derive(self.selected, &self.flow.outcome())
    }

    /// Sample every animator at `now`. `None` after teardown.
    pub fn tick(&mut self, now: Millis) -> PipevizResult<Option<DiagramFrame>> {
        if self.is_torn_down() {
            return Ok(None);
        }
        let outcome = self.flow.outcome();
        let loading = outcome.is_loading();

        let mut stages = Vec::with_capacity(self.animators.len());
        for animator in &mut self.animators {
            let Some(tick) = animator.tick(now)? else {
                continue;
            };
            let stage = tick.stage.stage();
            let selected = self.selected == Some(tick.stage);
            stages.push(StageView {
                title: stage.title,
                description: stage.description,
                slot: stage.slot,
                selected,
                loading: selected && loading,
                tick,
            });
        }

        Ok(Some(DiagramFrame {
            at: now,
            selected: self.selected,
            stages,
            panel: PanelView::derive(self.selected, &outcome),
        }))
    }

    /// Stop every animator. Later ticks return `None`; an in-flight request may still publish.
    pub fn teardown(&self) {
        if !self.stop.is_cancelled() {
            tracing::info!("diagram torn down");
            self.stop.cancel();
        }
    }
}

impl Drop for DiagramController {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagram/controller.rs"]
mod tests;
