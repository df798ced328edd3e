//! History queries.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use log::error;

use super::super::types::{AppState, DailyQuery, ErrorBody, HistoryListing, SessionsQuery};
use crate::storage::{HistoryFilter, HistoryStore};

const DEFAULT_DAILY_DAYS: i64 = 30;
const DEFAULT_SESSIONS_PER_PAGE: i64 = 20;

/// Records for one keyword/domain pair, oldest first
pub async fn daily_history_handler(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Response {
    let Some(history) = history_store(&state) else {
        return history_disabled();
    };
    let (Some(keyword), Some(domain)) = (
        query.keyword.filter(|k| !k.is_empty()),
        query.domain.filter(|d| !d.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing keyword or domain")),
        )
            .into_response();
    };

    let days = query.days.unwrap_or(DEFAULT_DAILY_DAYS);
    match history
        .query_daily_history(&keyword, &domain, days, Utc::now().timestamp_millis())
        .await
    {
        Ok(records) => Json(records).into_response(),
        Err(e) => query_failed("daily history", e),
    }
}

/// Filtered listing, newest first
pub async fn all_history_handler(
    State(state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> Response {
    let Some(history) = history_store(&state) else {
        return history_disabled();
    };

    match history.query_recent_history(&filter).await {
        Ok(results) => Json(HistoryListing { results }).into_response(),
        Err(e) => query_failed("history", e),
    }
}

/// Per-session summaries, most recent first
pub async fn sessions_handler(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Response {
    let Some(history) = history_store(&state) else {
        return history_disabled();
    };

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_SESSIONS_PER_PAGE);
    match history.query_sessions(page, per_page).await {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => query_failed("sessions", e),
    }
}

fn history_store(state: &AppState) -> Option<&HistoryStore> {
    state.history.as_ref()
}

fn history_disabled() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody::new("History is not enabled")),
    )
        .into_response()
}

fn query_failed(what: &str, e: impl std::fmt::Display) -> Response {
    error!("Error fetching {}: {}", what, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(e.to_string())),
    )
        .into_response()
}
