use crate::generate::GenerationError;

/// Crate-wide result alias.
pub type PipevizResult<T> = Result<T, PipevizError>;

/// Errors surfaced by the pipeviz library.
#[derive(thiserror::Error, Debug)]
pub enum PipevizError {
    /// Invalid input or identifiers.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed animation tables or keyframes.
    #[error("animation error: {0}")]
    Animation(String),

    /// Unusable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// JSON encode/decode failures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The explanation collaborator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipevizError {
    /// Build a [`PipevizError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PipevizError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`PipevizError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PipevizError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for PipevizError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
