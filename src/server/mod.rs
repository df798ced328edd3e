//! HTTP API.
//!
//! Provides:
//! - `/health` and `/status` for liveness and processing counters
//! - `/api/stream/save` and `/api/stream` for prepared, streamed batch checks
//! - `/api/bulk/check` for top-domain listings over several keywords
//! - `/api/history/*` for reading back stored checks

mod handlers;
mod types;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;

use handlers::{
    all_history_handler, bulk_check_handler, daily_history_handler, health_handler,
    save_session_handler, sessions_handler, status_handler, stream_handler,
};
pub use types::{AppState, ErrorBody, SessionCreated};

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/api/stream/save", post(save_session_handler))
        .route("/api/stream", get(stream_handler))
        .route("/api/bulk/check", post(bulk_check_handler))
        .route("/api/history/daily", get(daily_history_handler))
        .route("/api/history/all", get(all_history_handler))
        .route("/api/history/sessions", get(sessions_handler))
        .with_state(state)
}

/// Binds `addr` and serves the API until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind API server to {}: {}", addr, e))?;

    log::info!("API server listening on http://{}/", addr);
    log::info!("  - Stream: http://{}/api/stream", addr);
    log::info!("  - Status: http://{}/status", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    Ok(())
}
