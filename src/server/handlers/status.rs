//! Liveness and counters.

use axum::{extract::State, Json};
use chrono::Utc;

use super::super::types::{AppState, CounterGroup, HealthResponse, StatusResponse};

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Processing counters accumulated since startup
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        live_sessions: state.sessions.len(),
        errors: CounterGroup::errors(&state.stats),
        info: CounterGroup::info(&state.stats),
    })
}
