use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the analysis pipeline and its collaborators
#[derive(Debug, Error)]
pub enum LensError {
    /// Bad URL, unsupported protocol or malformed request parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Page cannot be processed as static HTML (script-rendered, wrong content type)
    #[error("Unprocessable content: {0}")]
    UnprocessableContent(String),

    /// Raw HTML or the reduced payload exceeds its ceiling
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upstream fetch did not complete in time
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Non-2xx response, redirect loop or protected page
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// A tool could not finish its work
    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    /// Tool parameters did not match the tool's schema
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Stable, serializable classification of a [`LensError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UnprocessableContent,
    PayloadTooLarge,
    UpstreamTimeout,
    UpstreamFailure,
    Internal,
}

impl LensError {
    /// Map this error onto its stable kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            LensError::InvalidInput(_) | LensError::InvalidParams(_) => ErrorKind::InvalidInput,
            LensError::UnprocessableContent(_) => ErrorKind::UnprocessableContent,
            LensError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            LensError::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
            LensError::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            LensError::ToolExecutionFailed { .. } | LensError::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<reqwest::Error> for LensError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LensError::UpstreamTimeout(e.to_string())
        } else if e.is_redirect() {
            LensError::UpstreamFailure(format!("Too many redirects: {}", e))
        } else if e.is_builder() {
            LensError::InvalidInput(e.to_string())
        } else {
            LensError::UpstreamFailure(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LensError>;
