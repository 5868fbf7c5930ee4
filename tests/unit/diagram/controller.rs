use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::explain::flow::FlowOpts;
use crate::generate::{ExplanationGenerator, GenerationError, GenerationRequest};

/// Answers with the stage title as the role; `slow_title` takes 5s, the rest 100ms.
struct EchoGenerator {
    calls: AtomicUsize,
    slow_title: Option<&'static str>,
}

impl EchoGenerator {
    fn new(slow: Option<StageId>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            slow_title: slow.map(|s| s.stage().title),
        })
    }
}

#[async_trait]
impl ExplanationGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let title = StageId::ALL
            .iter()
            .map(|s| s.stage().title)
            .find(|t| request.prompt.contains(&format!("'{t}'")))
            .unwrap_or("?");
        let delay = if Some(title) == self.slow_title { 5_000 } else { 100 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(format!(
            "### Role\n{title}\n### Mechanism\n- one\n- two\n### Importance\nhigh"
        ))
    }
}

fn controller(generator: Arc<EchoGenerator>) -> DiagramController {
    let flow = ExplanationRequestFlow::new(generator, FlowOpts::default());
    DiagramController::mount(flow, Millis(0), AnimationOpts::default()).unwrap()
}

fn role_of(outcome: &RequestOutcome) -> &str {
    match outcome {
        RequestOutcome::Parsed { explanation, .. } => &explanation.role,
        other => panic!("not parsed: {other:?}"),
    }
}

#[test]
fn tick_samples_all_six_stages_in_display_order() {
    let mut c = controller(EchoGenerator::new(None));
    let frame = c.tick(Millis(1000)).unwrap().unwrap();
    let ids: Vec<_> = frame.stages.iter().map(|s| s.tick.stage).collect();
    assert_eq!(ids, StageId::ALL.to_vec());
    assert_eq!(frame.panel, PanelView::Welcome);
    assert!(frame.stages.iter().all(|s| !s.selected && !s.loading));
}

#[tokio::test(start_paused = true)]
async fn selection_marks_the_stage_and_loads() {
    let generator = EchoGenerator::new(None);
    let mut c = controller(generator.clone());
    let pending = c.select_stage(StageId::Consensus).unwrap();

    let frame = c.tick(Millis(10)).unwrap().unwrap();
    let consensus = &frame.stages[3];
    assert!(consensus.selected && consensus.loading);
    assert!(frame.stages.iter().filter(|s| s.selected).count() == 1);
    assert_eq!(frame.panel, PanelView::Loading { title: "Consensus" });

    pending.resolve().await.unwrap();
    assert!(!c.is_loading());
    assert_eq!(role_of(&c.outcome()), "Consensus");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn reclicking_the_loading_stage_is_a_no_op() {
    let generator = EchoGenerator::new(None);
    let mut c = controller(generator.clone());
    let pending = c.select_stage(StageId::Users).unwrap();
    assert!(c.select_stage(StageId::Users).is_none());
    pending.resolve().await.unwrap();
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    // Once settled, clicking again retries.
    assert!(c.select_stage(StageId::Users).is_some());
}

#[tokio::test(start_paused = true)]
async fn switching_stage_supersedes_the_slow_request() {
    let mut c = controller(EchoGenerator::new(Some(StageId::Users)));
    let a = c.select_stage(StageId::Users).unwrap();
    let b = c.select_stage(StageId::Turbine).unwrap();
    assert_eq!(c.selected(), Some(StageId::Turbine));

    let (a, b) = tokio::join!(a.resolve(), b.resolve());
    assert!(a.is_none());
    assert!(b.is_some());
    assert_eq!(role_of(&c.outcome()), "Turbine");
    assert!(matches!(c.panel(), PanelView::Explanation { title: "Turbine", .. }));
}

#[test]
fn teardown_stops_ticks_and_selection() {
    let mut c = controller(EchoGenerator::new(None));
    assert!(c.tick(Millis(0)).unwrap().is_some());
    c.teardown();
    assert!(c.is_torn_down());
    assert!(c.tick(Millis(100)).unwrap().is_none());
    assert!(c.select_stage(StageId::Turbine).is_none());
    assert!(c.animators().iter().all(StageAnimator::is_stopped));
}

#[test]
fn frame_serializes_for_a_renderer() {
    let mut c = controller(EchoGenerator::new(None));
    let frame = c.tick(Millis(2600)).unwrap().unwrap();
    let json = serde_json::to_value(&frame).unwrap();
    assert_eq!(json["stages"][2]["title"], "Block Building");
    assert_eq!(json["stages"][2]["state"], "banking");
    assert_eq!(json["stages"][2]["frame"]["stage"], "BLOCK_BUILDING");
    assert_eq!(json["panel"]["panel"], "welcome");
}
