//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};
use serde_json::json;

use tripchat_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The Completion Service could not be reached. Maps to 503.
    Chat(ChatError),
    /// Malformed request. Maps to 400.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message, details) = match &self {
            AppError::Chat(e) => {
                // Upstream detail goes to the log, never to the client.
                tracing::warn!(error = %e, "chat request failed");
                (
                    "ASSISTANT_UNAVAILABLE",
                    e.user_message().to_string(),
                    Some(json!({ "retryable": e.is_retryable() })),
                )
            }
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone(), None),
        };

        ApiResponse::error(code, &message, details, String::new(), 0).into_response()
    }
}
