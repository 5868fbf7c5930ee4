//! pipeviz drives an interactive diagram of a blockchain transaction pipeline.
//!
//! Six stages (users, Gulf Stream, block building, consensus, block verification, Turbine) each
//! loop through their own timed state machine. Selecting a stage asks an LLM for a three-part
//! explanation, which is parsed and published for display.
//!
//! - Mount a [`DiagramController`] and [`drive`] it, or call [`DiagramController::tick`] yourself
//! - [`DiagramController::select_stage`] returns a [`PendingRequest`] to resolve
//! - Watch [`RequestOutcome`] changes or derive a [`PanelView`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod diagram;
pub mod explain;
pub mod foundation;
pub mod generate;
pub mod schedule;
pub mod stages;

pub use crate::config::PipevizConfig;
pub use crate::diagram::controller::{DiagramController, DiagramFrame, StageView};
pub use crate::diagram::driver::{DriveOpts, DriveStats, drive};
pub use crate::explain::display::{MechanismView, PanelView};
pub use crate::explain::flow::{
    ExplanationRequestFlow, Failure, FailureKind, FlowOpts, PendingRequest, RequestOutcome,
};
pub use crate::explain::parser::{Explanation, Parsed, parse_explanation};
pub use crate::foundation::core::Millis;
pub use crate::foundation::error::{PipevizError, PipevizResult};
pub use crate::generate::gemini::{GeminiClient, GeminiOpts};
pub use crate::generate::{ExplanationGenerator, GenerationError, GenerationRequest, SamplingParams};
pub use crate::schedule::clock::{Clock, ManualClock, SystemClock};
pub use crate::stages::catalog::{STAGES, Stage, StageId};
pub use crate::stages::{AnimationOpts, StageAnimator, StageFrame, StageTick};
