//! Top result hosts for a keyword.

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::config::{Device, BULK_SEARCH_RESULTS, MAX_BULK_URL_CHARS};
use crate::domain::host_of_url;
use crate::error_handling::{ErrorType, SearchError};
use crate::search::{SearchQuery, SearchResult};
use crate::storage::{CheckType, HistoryRecord, HistoryStore};
use crate::utils::truncate_chars;

use super::RankEngine;

/// One keyword's top-domain listing request.
#[derive(Debug, Clone)]
pub struct TopDomainsRequest {
    pub keyword: String,
    pub location: String,
    pub device: Device,
    /// Number of hosts to return
    pub limit: usize,
    pub api_key: Option<String>,
    pub session_id: Option<String>,
}

/// A result host in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopDomain {
    /// 1-based, counting only usable links
    pub position: u32,
    pub domain: String,
    pub url: String,
    pub title: String,
}

impl RankEngine {
    /// Lists the hosts of the first `limit` usable search results.
    ///
    /// With a history store attached, every listed host is appended as a `bulk`
    /// record at its listing position. Write failures are logged only.
    pub async fn top_domains(
        &self,
        request: &TopDomainsRequest,
    ) -> Result<Vec<TopDomain>, SearchError> {
        let query = SearchQuery {
            keyword: request.keyword.clone(),
            location: request.location.clone(),
            device: request.device,
            max_results: BULK_SEARCH_RESULTS,
            api_key: request.api_key.clone(),
        };
        let results = self.search.search(&query).await?;
        let top = collect_top_domains(&results, request.limit);

        if let Some(history) = &self.history {
            self.record_top_domains(history, request, &top).await;
        }
        Ok(top)
    }

    async fn record_top_domains(
        &self,
        history: &HistoryStore,
        request: &TopDomainsRequest,
        top: &[TopDomain],
    ) {
        let checked_at_ms = Utc::now().timestamp_millis();
        let mut saved = 0;
        for entry in top {
            let record = HistoryRecord {
                id: 0,
                keyword: request.keyword.trim().to_string(),
                domain: entry.domain.clone(),
                position: Some(entry.position),
                url: truncate_chars(&entry.url, MAX_BULK_URL_CHARS),
                location: request.location.clone(),
                device: request.device.as_str().to_string(),
                checked_at_ms,
                session_id: request.session_id.clone(),
                check_type: CheckType::Bulk,
            };
            match history.append(&record).await {
                Ok(_) => saved += 1,
                Err(e) => {
                    warn!("Could not save bulk history for {}: {}", record.keyword, e);
                    self.stats.increment_error(ErrorType::HistoryWriteError);
                }
            }
        }
        info!("Saved bulk history for {}: {} domains", request.keyword, saved);
    }
}

/// Numbers usable links from 1, skipping those without a host.
fn collect_top_domains(results: &[SearchResult], limit: usize) -> Vec<TopDomain> {
    results
        .iter()
        .filter_map(|result| {
            let domain = host_of_url(&result.url)?;
            Some((domain, result))
        })
        .take(limit)
        .zip(1..)
        .map(|((domain, result), position)| TopDomain {
            position,
            domain,
            url: result.url.clone(),
            title: result.title.clone(),
        })
        .collect()
}
