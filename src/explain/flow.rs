//! One explanation request per selection, published through a watch channel.
//!
//! Every [`ExplanationRequestFlow::begin`] bumps a generation counter. A [`PendingRequest`] only
//! publishes if its generation is still current, so a late answer for a stage the user has
//! already moved away from is dropped instead of overwriting the newer outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::explain::parser::{Explanation, Parsed, parse_explanation};
use crate::explain::prompt::explanation_request;
use crate::generate::{ExplanationGenerator, GenerationError, GenerationRequest, SamplingParams};
use crate::stages::catalog::StageId;

/// Request-flow settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlowOpts {
    /// Upper bound on one collaborator call.
    pub timeout_ms: u64,
    pub sampling: SamplingParams,
}

impl Default for FlowOpts {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            sampling: SamplingParams::default(),
        }
    }
}

impl FlowOpts {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The call itself failed (network, API, credentials, empty answer).
    Collaborator,
    /// No answer within the configured timeout.
    TimedOut,
    /// The collaborator answered with an error report.
    Reported,
    /// The ticket was dropped before an answer arrived.
    Abandoned,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// User-facing text.
    pub message: String,
}

impl Failure {
    fn from_error(err: &GenerationError) -> Self {
        match err {
            GenerationError::TimedOut(after) => Self {
                kind: FailureKind::TimedOut,
                message: format!(
                    "The explanation request timed out after {:.1}s.",
                    after.as_secs_f64()
                ),
            },
            other => Self {
                kind: FailureKind::Collaborator,
                message: format!("An error occurred while generating the explanation: {other}"),
            },
        }
    }

    fn abandoned() -> Self {
        Self {
            kind: FailureKind::Abandoned,
            message: "The explanation request was cancelled. Select the stage again to retry."
                .into(),
        }
    }
}

/// Latest published state of the explanation panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    #[default]
    Idle,
    Loading {
        stage: StageId,
    },
    Parsed {
        stage: StageId,
        explanation: Explanation,
    },
    ParseFallback {
        stage: StageId,
        explanation: Explanation,
        warning: &'static str,
    },
    Failed {
        stage: StageId,
        failure: Failure,
    },
}

impl RequestOutcome {
    /// Outcome for a successful collaborator reply.
    pub fn from_text(stage: StageId, text: &str) -> Self {
        match parse_explanation(text) {
            Parsed::Explanation(explanation) => Self::Parsed { stage, explanation },
            Parsed::Fallback {
                explanation,
                warning,
            } => Self::ParseFallback {
                stage,
                explanation,
                warning,
            },
            Parsed::Sentinel(message) => Self::Failed {
                stage,
                failure: Failure {
                    kind: FailureKind::Reported,
                    message,
                },
            },
        }
    }

    /// Outcome for a failed collaborator call.
    pub fn from_error(stage: StageId, err: &GenerationError) -> Self {
        Self::Failed {
            stage,
            failure: Failure::from_error(err),
        }
    }

    /// Stage this outcome belongs to.
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::Idle => None,
            Self::Loading { stage }
            | Self::Parsed { stage, .. }
            | Self::ParseFallback { stage, .. }
            | Self::Failed { stage, .. } => Some(*stage),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

struct Shared {
    // Only touched while holding the watch channel's write lock.
    generation: AtomicU64,
    outcome: watch::Sender<RequestOutcome>,
}

/// Issues explanation requests and publishes their outcomes.
pub struct ExplanationRequestFlow {
    generator: Arc<dyn ExplanationGenerator>,
    opts: FlowOpts,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ExplanationRequestFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplanationRequestFlow")
            .field("generator", &self.generator.name())
            .field("opts", &self.opts)
            .field("outcome", &*self.shared.outcome.borrow())
            .finish()
    }
}

impl ExplanationRequestFlow {
    pub fn new(generator: Arc<dyn ExplanationGenerator>, opts: FlowOpts) -> Self {
        let (outcome, _) = watch::channel(RequestOutcome::Idle);
        Self {
            generator,
            opts,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                outcome,
            }),
        }
    }

    pub fn opts(&self) -> &FlowOpts {
        &self.opts
    }

    /// Receiver that observes every published outcome.
    pub fn subscribe(&self) -> watch::Receiver<RequestOutcome> {
        self.shared.outcome.subscribe()
    }

    /// Snapshot of the current outcome.
    pub fn outcome(&self) -> RequestOutcome {
        self.shared.outcome.borrow().clone()
    }

    /// `true` while a request for `stage` is the current one.
    pub fn is_loading(&self, stage: StageId) -> bool {
        *self.shared.outcome.borrow() == RequestOutcome::Loading { stage }
    }

    /// Supersede any in-flight request, publish `Loading` and hand out the ticket for `stage`.
    pub fn begin(&self, stage: StageId) -> PendingRequest {
        let mut generation = 0;
        self.shared.outcome.send_modify(|outcome| {
            generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *outcome = RequestOutcome::Loading { stage };
        });
        tracing::info!(%stage, generation, "explanation requested");

        PendingRequest {
            stage,
            generation,
            request: explanation_request(stage.stage(), self.opts.sampling),
            timeout: self.opts.timeout(),
            generator: Arc::clone(&self.generator),
            shared: Arc::clone(&self.shared),
            finished: false,
        }
    }

    /// Begin and resolve in one go.
    pub async fn run(&self, stage: StageId) -> Option<RequestOutcome> {
        self.begin(stage).resolve().await
    }
}

/// Ticket for one issued request. Resolve it exactly once.
///
/// Dropping an unfinished ticket while it is still current publishes an abandoned failure, so the
/// stage does not stay loading and can be selected again.
pub struct PendingRequest {
    stage: StageId,
    generation: u64,
    request: GenerationRequest,
    timeout: Duration,
    generator: Arc<dyn ExplanationGenerator>,
    shared: Arc<Shared>,
    finished: bool,
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("stage", &self.stage)
            .field("generation", &self.generation)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PendingRequest {
    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// The prompt and sampling this ticket will send.
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Call the collaborator once and publish the result if still current.
    ///
    /// Returns the published outcome, or `None` when a newer selection superseded this one.
    #[tracing::instrument(skip(self), fields(stage = %self.stage, generation = self.generation))]
    pub async fn resolve(self) -> Option<RequestOutcome> {
        let reply = tokio::time::timeout(self.timeout, self.generator.generate(&self.request)).await;
        let outcome = match reply {
            Ok(Ok(text)) => RequestOutcome::from_text(self.stage, &text),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "explanation request failed");
                RequestOutcome::from_error(self.stage, &err)
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "explanation request timed out");
                RequestOutcome::from_error(self.stage, &GenerationError::TimedOut(self.timeout))
            }
        };
        self.finish(outcome)
    }

    /// Publish `outcome` unless this ticket has been superseded.
    pub fn finish(mut self, outcome: RequestOutcome) -> Option<RequestOutcome> {
        self.finished = true;
        let mut published = false;
        self.shared.outcome.send_if_modified(|current| {
            if self.shared.generation.load(Ordering::SeqCst) != self.generation {
                return false;
            }
            *current = outcome.clone();
            published = true;
            true
        });

        if published {
            tracing::info!(stage = %self.stage, "explanation published");
            Some(outcome)
        } else {
            tracing::debug!(stage = %self.stage, generation = self.generation, "stale explanation dropped");
            None
        }
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let abandoned = self.shared.outcome.send_if_modified(|current| {
            if self.shared.generation.load(Ordering::SeqCst) != self.generation {
                return false;
            }
            *current = RequestOutcome::Failed {
                stage: self.stage,
                failure: Failure::abandoned(),
            };
            true
        });
        if abandoned {
            tracing::warn!(stage = %self.stage, generation = self.generation, "explanation request abandoned");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/explain/flow.rs"]
mod tests;
