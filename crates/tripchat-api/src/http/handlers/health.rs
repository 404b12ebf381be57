//! GET /api/v1/health - liveness plus the number of live sessions.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<Health>> {
    let clock = RequestClock::start();
    let health = Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.orchestrator.store().len(),
    };
    Json(ApiResponse::success(health, clock.request_id.clone(), clock.elapsed_ms()))
}
