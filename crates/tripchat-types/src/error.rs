use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::llm::LlmError;

/// The single user-facing message for an unreachable Completion Service.
pub const ASSISTANT_UNAVAILABLE_MESSAGE: &str =
    "The assistant is temporarily unavailable, please retry.";

/// Errors surfaced by the chat entry point.
///
/// Only an unreachable Completion Service fails a request; malformed model
/// output and content lookup problems are absorbed before reaching here.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("completion service unavailable: {0}")]
    CompletionUnavailable(#[source] LlmError),

    #[error("completion service timed out after {0:?}")]
    CompletionTimeout(Duration),
}

impl ChatError {
    /// Whether the caller may retry the same message.
    ///
    /// The user turn stays recorded, so a retry continues the same context.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::CompletionTimeout(_) => true,
            ChatError::CompletionUnavailable(LlmError::AuthenticationFailed)
            | ChatError::CompletionUnavailable(LlmError::InvalidRequest(_)) => false,
            ChatError::CompletionUnavailable(_) => true,
        }
    }

    /// Message safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        ASSISTANT_UNAVAILABLE_MESSAGE
    }
}

/// Errors from the Content Search Service.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search service returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode search response: {0}")]
    Decode(String),

    #[error("search timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Validation(String),
}
