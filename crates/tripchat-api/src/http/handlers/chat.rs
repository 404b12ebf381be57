//! Chat endpoints.
//!
//! POST   /api/v1/chat               - send one message, get the assistant reply
//! DELETE /api/v1/chat/{session_id}  - forget a session (idempotent)

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use tripchat_types::chat::ChatReply;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub session_id: String,
    pub cleared: bool,
}

/// POST /api/v1/chat
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let clock = RequestClock::start();

    if body.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id must not be empty".to_string()));
    }
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let reply = state
        .orchestrator
        .handle(&body.session_id, &body.message)
        .await?;

    let resp = ApiResponse::success(reply, clock.request_id.clone(), clock.elapsed_ms())
        .with_link("self", "/api/v1/chat")
        .with_link("clear", &format!("/api/v1/chat/{}", body.session_id));
    Ok(Json(resp))
}

/// DELETE /api/v1/chat/{session_id}
///
/// Always reports `cleared: true`; clearing an unknown session is not an error.
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse<Cleared>> {
    let clock = RequestClock::start();
    state.orchestrator.clear(&session_id);

    Json(ApiResponse::success(
        Cleared {
            session_id,
            cleared: true,
        },
        clock.request_id.clone(),
        clock.elapsed_ms(),
    ))
}
