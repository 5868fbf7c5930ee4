//! The external text-generation collaborator.
//!
//! The request flow only sees [`ExplanationGenerator`]; [`gemini::GeminiClient`] is the concrete
//! HTTP implementation. Handles are built once and shared as `Arc<dyn ExplanationGenerator>`.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;

/// Fixed sampling knobs sent with every request.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            top_p: 0.95,
            top_k: 64,
        }
    }
}

/// One generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub sampling: SamplingParams,
}

/// Ways the collaborator can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("missing credentials: set {0}")]
    MissingCredentials(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("the model returned no text")]
    EmptyResponse,

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("no response after {0:?}")]
    TimedOut(Duration),
}

/// Produces raw explanation text for a prompt.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Issue exactly one request; no retries.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Stand-in for a collaborator that could not be constructed. Every call fails with the
/// construction error, so the failure shows up in the panel instead of at startup.
#[derive(Debug, Clone)]
pub struct Unavailable(pub GenerationError);

#[async_trait]
impl ExplanationGenerator for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(self.0.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/mod.rs"]
mod tests;
