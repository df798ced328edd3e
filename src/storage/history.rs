//! Ranking history persistence.
//!
//! Every processed pair appends one row to `rank_history`. Rows are read back
//! for per-pair trends, filtered listings and per-session summaries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Default row limit for [`HistoryStore::query_recent_history`].
pub const DEFAULT_HISTORY_LIMIT: i64 = 1000;
/// Upper bound on sessions returned per page.
pub const MAX_SESSIONS_PER_PAGE: i64 = 100;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// How a check was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    #[default]
    Single,
    Bulk,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Single => "single",
            CheckType::Bulk => "bulk",
        }
    }

    fn from_db(raw: &str) -> Self {
        match raw {
            "bulk" => CheckType::Bulk,
            _ => CheckType::Single,
        }
    }
}

/// One stored ranking check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id; zero for records not yet stored
    #[serde(default)]
    pub id: i64,
    pub keyword: String,
    pub domain: String,
    /// `None` when the domain was not found
    pub position: Option<u32>,
    pub url: String,
    pub location: String,
    pub device: String,
    /// UTC epoch milliseconds
    pub checked_at_ms: i64,
    pub session_id: Option<String>,
    pub check_type: CheckType,
}

/// Filters for [`HistoryStore::query_recent_history`].
///
/// `keyword` and `domain` match partially; `location` and `device` exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    pub keyword: Option<String>,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub device: Option<String>,
    /// Inclusive lower bound, UTC epoch milliseconds
    pub start_ms: Option<i64>,
    /// Inclusive upper bound, UTC epoch milliseconds
    pub end_ms: Option<i64>,
    pub limit: Option<i64>,
}

/// Aggregate of all rows written under one session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub check_type: CheckType,
    /// Earliest check in the session, UTC epoch milliseconds
    pub checked_at_ms: i64,
    pub keyword_count: i64,
    pub domain_count: i64,
    pub total_records: i64,
    /// True when at least one pair was found
    pub success: bool,
    pub location: String,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPage {
    pub sessions: Vec<SessionSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Append-only store for ranking history.
#[derive(Clone)]
pub struct HistoryStore {
    pool: Arc<SqlitePool>,
}

impl HistoryStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Inserts one record and returns its row id.
    pub async fn append(&self, record: &HistoryRecord) -> Result<i64, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO rank_history
                (keyword, domain, position, url, location, device, checked_at_ms, session_id, check_type)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.keyword)
        .bind(&record.domain)
        .bind(record.position.map(i64::from))
        .bind(&record.url)
        .bind(&record.location)
        .bind(&record.device)
        .bind(record.checked_at_ms)
        .bind(record.session_id.as_deref())
        .bind(record.check_type.as_str())
        .execute(self.pool.as_ref())
        .await
        .map_err(DatabaseError::SqlError)?;

        Ok(result.last_insert_rowid())
    }

    /// Records for one exact keyword/domain pair from the last `days` days, oldest
    /// first. `now_ms` anchors the window.
    pub async fn query_daily_history(
        &self,
        keyword: &str,
        domain: &str,
        days: i64,
        now_ms: i64,
    ) -> Result<Vec<HistoryRecord>, DatabaseError> {
        let since_ms = now_ms.saturating_sub(days.max(0).saturating_mul(MS_PER_DAY));
        let rows = sqlx::query(
            "SELECT id, keyword, domain, position, url, location, device, checked_at_ms, session_id, check_type
             FROM rank_history
             WHERE keyword = ? AND domain = ? AND checked_at_ms >= ?
             ORDER BY checked_at_ms ASC, id ASC",
        )
        .bind(keyword)
        .bind(domain)
        .bind(since_ms)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(DatabaseError::SqlError)?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Most recent records matching `filter`, newest first.
    pub async fn query_recent_history(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<HistoryRecord>, DatabaseError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, keyword, domain, position, url, location, device, checked_at_ms, session_id, check_type
             FROM rank_history WHERE 1 = 1",
        );

        if let Some(keyword) = non_empty(&filter.keyword) {
            query.push(" AND keyword LIKE ").push_bind(format!("%{keyword}%"));
        }
        if let Some(domain) = non_empty(&filter.domain) {
            query.push(" AND domain LIKE ").push_bind(format!("%{domain}%"));
        }
        if let Some(location) = non_empty(&filter.location) {
            query.push(" AND location = ").push_bind(location.to_string());
        }
        if let Some(device) = non_empty(&filter.device) {
            query.push(" AND device = ").push_bind(device.to_string());
        }
        if let Some(start_ms) = filter.start_ms {
            query.push(" AND checked_at_ms >= ").push_bind(start_ms);
        }
        if let Some(end_ms) = filter.end_ms {
            query.push(" AND checked_at_ms <= ").push_bind(end_ms);
        }

        let limit = filter.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(0);
        query
            .push(" ORDER BY checked_at_ms DESC, id DESC LIMIT ")
            .push_bind(limit);

        let rows = query
            .build()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(DatabaseError::SqlError)?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// One page of session summaries, most recent session first.
    pub async fn query_sessions(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<SessionPage, DatabaseError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_SESSIONS_PER_PAGE);
        let offset = (page - 1).saturating_mul(per_page);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM (
                SELECT 1 FROM rank_history WHERE session_id IS NOT NULL
                GROUP BY session_id, check_type, location, device
             )",
        )
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(DatabaseError::SqlError)?;

        let rows = sqlx::query(
            "SELECT session_id, check_type, location, device,
                    MIN(checked_at_ms) AS first_checked_ms,
                    COUNT(DISTINCT keyword) AS keyword_count,
                    COUNT(DISTINCT domain) AS domain_count,
                    COUNT(id) AS total_records,
                    SUM(CASE WHEN position IS NOT NULL THEN 1 ELSE 0 END) AS success_count
             FROM rank_history
             WHERE session_id IS NOT NULL
             GROUP BY session_id, check_type, location, device
             ORDER BY first_checked_ms DESC
             LIMIT ? OFFSET ?",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(DatabaseError::SqlError)?;

        let sessions = rows
            .iter()
            .map(|row| SessionSummary {
                session_id: row.get("session_id"),
                check_type: CheckType::from_db(
                    row.get::<Option<String>, _>("check_type")
                        .as_deref()
                        .unwrap_or_default(),
                ),
                checked_at_ms: row.get("first_checked_ms"),
                keyword_count: row.get("keyword_count"),
                domain_count: row.get("domain_count"),
                total_records: row.get("total_records"),
                success: row.get::<i64, _>("success_count") > 0,
                location: row.get::<Option<String>, _>("location").unwrap_or_default(),
                device: row.get::<Option<String>, _>("device").unwrap_or_default(),
            })
            .collect();

        Ok(SessionPage {
            sessions,
            total,
            page,
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> HistoryRecord {
    HistoryRecord {
        id: row.get("id"),
        keyword: row.get("keyword"),
        domain: row.get("domain"),
        position: row
            .get::<Option<i64>, _>("position")
            .and_then(|p| u32::try_from(p).ok()),
        url: row.get::<Option<String>, _>("url").unwrap_or_default(),
        location: row.get::<Option<String>, _>("location").unwrap_or_default(),
        device: row.get::<Option<String>, _>("device").unwrap_or_default(),
        checked_at_ms: row.get("checked_at_ms"),
        session_id: row.get("session_id"),
        check_type: CheckType::from_db(
            row.get::<Option<String>, _>("check_type")
                .as_deref()
                .unwrap_or_default(),
        ),
    }
}
