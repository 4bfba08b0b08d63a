//! Render error taxonomy.

use crate::consts::{ENGINE_UNAVAILABLE_MESSAGE, FALLBACK_RENDER_MESSAGE};
use crate::engine::EngineError;

/// Why a render attempt failed. Every variant is terminal for its source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// No rendering engine is loaded. Permanent.
    #[error("{}", ENGINE_UNAVAILABLE_MESSAGE)]
    EngineUnavailable,

    /// The engine rejected the text with a diagnostic.
    #[error("{message}")]
    Syntax { message: String },

    /// Any other rejection.
    #[error("{}", FALLBACK_RENDER_MESSAGE)]
    Unknown,

    /// The engine did not answer within the configured bound.
    #[error("diagram render timed out after {secs} s")]
    Timeout { secs: u64 },
}

impl RenderError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EngineUnavailable => "E_ENGINE_UNAVAILABLE",
            Self::Syntax { .. } => "E_RENDER_SYNTAX",
            Self::Unknown => "E_RENDER_UNKNOWN",
            Self::Timeout { .. } => "E_RENDER_TIMEOUT",
        }
    }

    /// Render failures are never retried internally; recovery is new text.
    #[must_use]
    pub fn retryable(&self) -> bool {
        false
    }
}

impl From<EngineError> for RenderError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable => Self::EngineUnavailable,
            EngineError::Rejected { diagnostic } if !diagnostic.trim().is_empty() => {
                Self::Syntax { message: diagnostic.trim().to_owned() }
            }
            EngineError::Rejected { .. } | EngineError::Init(_) | EngineError::Other(_) => Self::Unknown,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
