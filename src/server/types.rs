//! HTTP server state and payloads.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::batch::BatchRunner;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::ranking::TopDomain;
use crate::session::SessionStore;
use crate::storage::{HistoryRecord, HistoryStore};

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub runner: BatchRunner,
    pub sessions: Arc<SessionStore>,
    /// `None` when the server runs without a history database
    pub history: Option<HistoryStore>,
    pub stats: Arc<ProcessingStats>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    /// Builds state around `runner`, sharing its engine's history and counters.
    pub fn new(runner: BatchRunner, session_ttl: Duration) -> Self {
        let history = runner.engine().history().cloned();
        let stats = Arc::clone(runner.engine().stats());
        Self {
            runner,
            sessions: Arc::new(SessionStore::new(session_ttl)),
            history,
            stats,
            start_time: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
    pub version: &'static str,
}

/// JSON response for `/status`
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub live_sessions: usize,
    pub errors: CounterGroup,
    pub info: CounterGroup,
}

/// Non-zero counters keyed by their display label.
#[derive(Serialize)]
pub struct CounterGroup {
    pub total: usize,
    pub counts: BTreeMap<&'static str, usize>,
}

impl CounterGroup {
    pub fn errors(stats: &ProcessingStats) -> Self {
        let counts = ErrorType::iter()
            .map(|e| (e.as_str(), stats.get_error_count(e)))
            .filter(|(_, count)| *count > 0)
            .collect();
        Self {
            total: stats.total_errors(),
            counts,
        }
    }

    pub fn info(stats: &ProcessingStats) -> Self {
        let counts = InfoType::iter()
            .map(|i| (i.as_str(), stats.get_info_count(i)))
            .filter(|(_, count)| *count > 0)
            .collect();
        Self {
            total: stats.total_info(),
            counts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub keyword: Option<String>,
    pub domain: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Serialize)]
pub struct HistoryListing {
    pub results: Vec<HistoryRecord>,
}

/// JSON body of `/api/bulk/check`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkCheckRequest {
    /// Expected to be an array of strings; anything else is rejected
    #[serde(default)]
    pub keywords: serde_json::Value,
    pub location: Option<String>,
    pub device: Option<String>,
    pub limit: Option<i64>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkKeywordResult {
    pub keyword: String,
    #[serde(rename = "topDomains")]
    pub top_domains: Vec<TopDomain>,
}

#[derive(Debug, Serialize)]
pub struct BulkCheckResponse {
    pub session_id: String,
    pub results: Vec<BulkKeywordResult>,
}
