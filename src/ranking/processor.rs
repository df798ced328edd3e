//! Single pair processing.
//!
//! A check runs strictly in sequence: normalize the domain, resolve its
//! redirect chain, query the provider, match, then persist. Any failure is
//! turned into an error marker on the returned record.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::config::{
    Config, Device, MAX_CHAIN_OUTPUT, MAX_URL_OUTPUT_CHARS, PROCESSING_FAILED, URL_NOT_FOUND,
};
use crate::domain::normalize_host;
use crate::error_handling::{
    CheckError, ErrorType, InfoType, InitializationError, ProcessingStats,
};
use crate::fetch::RedirectResolver;
use crate::initialization::{init_client, init_redirect_client};
use crate::search::{SearchQuery, SerperClient};
use crate::storage::{CheckType, HistoryRecord, HistoryStore};
use crate::utils::truncate_chars;

use super::matcher::find_ranking;
use super::result::{Position, RankCheckResult};

/// Everything needed to check one keyword/domain pair.
#[derive(Debug, Clone)]
pub struct PairRequest {
    pub keyword: String,
    /// Domain as supplied by the caller (normalized internally)
    pub domain: String,
    pub location: String,
    pub device: Device,
    pub session_id: Option<String>,
    pub check_type: CheckType,
    /// Per-request provider key, overriding the configured one
    pub api_key: Option<String>,
}

impl PairRequest {
    pub fn new(keyword: &str, domain: &str, location: &str, device: Device) -> Self {
        Self {
            keyword: keyword.to_string(),
            domain: domain.to_string(),
            location: location.to_string(),
            device,
            session_id: None,
            check_type: CheckType::Single,
            api_key: None,
        }
    }
}

/// Checks keyword/domain pairs against live search results.
pub struct RankEngine {
    resolver: RedirectResolver,
    pub(super) search: SerperClient,
    pub(super) history: Option<HistoryStore>,
    pub(super) stats: Arc<ProcessingStats>,
    max_results: usize,
}

impl RankEngine {
    pub fn new(
        resolver: RedirectResolver,
        search: SerperClient,
        stats: Arc<ProcessingStats>,
        max_results: usize,
    ) -> Self {
        Self {
            resolver,
            search,
            history: None,
            stats,
            max_results,
        }
    }

    /// Builds an engine with fresh HTTP clients from `config`.
    pub fn from_config(
        config: &Config,
        stats: Arc<ProcessingStats>,
    ) -> Result<Self, InitializationError> {
        let resolver = RedirectResolver::new(
            init_redirect_client(config)?,
            config.max_redirects,
            Arc::clone(&stats),
        );
        let search = SerperClient::new(init_client(config)?, config, Arc::clone(&stats));
        Ok(Self::new(resolver, search, stats, config.max_results))
    }

    /// Records every processed pair in `history`.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Checks one pair with default session settings. Never fails.
    pub async fn process_pair(
        &self,
        keyword: &str,
        domain: &str,
        location: &str,
        device: Device,
    ) -> RankCheckResult {
        self.process(&PairRequest::new(keyword, domain, location, device))
            .await
    }

    /// Checks one pair. Never fails: errors are logged and reported through the
    /// record's `error` field with position `N/A`.
    pub async fn process(&self, request: &PairRequest) -> RankCheckResult {
        let mut out =
            RankCheckResult::unmatched(&request.keyword, &request.domain, &request.location);

        if let Err(e) = self.check(request, &mut out).await {
            warn!(
                "Check failed: {} | {} | {}",
                request.keyword, request.domain, e
            );
            out.position = Position::NotFound;
            out.url = URL_NOT_FOUND.to_string();
            out.ranking_host = None;
            out.error = Some(PROCESSING_FAILED.to_string());
        }

        if let Some(history) = &self.history {
            self.record_history(history, request, &out).await;
        }

        out
    }

    async fn check(
        &self,
        request: &PairRequest,
        out: &mut RankCheckResult,
    ) -> Result<(), CheckError> {
        let host = normalize_host(&request.domain).ok_or_else(|| {
            self.stats.increment_error(ErrorType::InvalidDomain);
            CheckError::InvalidDomain(request.domain.clone())
        })?;

        let resolved = self.resolver.final_host_for_input(host.as_str()).await;
        out.redirect_chain = displayed_chain(&resolved.chain);

        let query = SearchQuery {
            keyword: request.keyword.clone(),
            location: request.location.clone(),
            device: request.device,
            max_results: self.max_results,
            api_key: request.api_key.clone(),
        };
        let results = self.search.search(&query).await?;

        info!(
            "Searching for: {} | Target: {} | Chain: {:?}",
            request.keyword, resolved.final_host, resolved.chain
        );

        let found = find_ranking(&resolved.final_host, &resolved.chain, &results, |link| {
            let resolver = &self.resolver;
            async move { resolver.final_host_of_url(&link).await }
        })
        .await;

        match found {
            Some(m) => {
                info!(
                    "Found {}: {} | {} at position #{}",
                    if m.via_redirect { "match via redirect" } else { "exact match" },
                    request.keyword,
                    m.ranking_host.as_deref().unwrap_or(""),
                    m.position
                );
                self.stats.increment_info(if m.via_redirect {
                    InfoType::MatchedViaRedirect
                } else {
                    InfoType::MatchedExact
                });
                out.position = Position::Ranked(m.position);
                out.url = truncate_chars(&m.url, MAX_URL_OUTPUT_CHARS);
                out.ranking_host = m.ranking_host;
            }
            None => {
                warn!(
                    "No match found: {} | Target: {} | Chain: {:?} | Checked {} results",
                    request.keyword,
                    resolved.final_host,
                    resolved.chain,
                    results.len()
                );
                self.stats.increment_info(InfoType::Unmatched);
            }
        }

        Ok(())
    }

    /// Appends the outcome to history. Failures are logged and counted only.
    async fn record_history(
        &self,
        history: &HistoryStore,
        request: &PairRequest,
        result: &RankCheckResult,
    ) {
        let record = HistoryRecord {
            id: 0,
            keyword: request.keyword.trim().to_string(),
            domain: request.domain.trim().to_string(),
            position: result.position.as_option(),
            url: result.url.clone(),
            location: request.location.clone(),
            device: request.device.as_str().to_string(),
            checked_at_ms: Utc::now().timestamp_millis(),
            session_id: request.session_id.clone(),
            check_type: request.check_type,
        };

        match history.append(&record).await {
            Ok(_) => info!(
                "Saved history: {} | {} | {}",
                record.keyword, record.domain, result.position
            ),
            Err(e) => {
                warn!("Could not save history: {}", e);
                self.stats.increment_error(ErrorType::HistoryWriteError);
            }
        }
    }
}

/// The leading part of a redirect chain that is reported in results.
fn displayed_chain(chain: &[String]) -> Vec<String> {
    chain.iter().take(MAX_CHAIN_OUTPUT).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_chain_keeps_first_ten_hosts() {
        let chain: Vec<String> = (0..15).map(|n| format!("h{n}.example")).collect();
        let shown = displayed_chain(&chain);
        assert_eq!(shown.len(), 10);
        assert_eq!(shown, chain[..10]);
    }

    #[test]
    fn test_displayed_chain_short_chain_unchanged() {
        let chain = vec!["moz.com".to_string()];
        assert_eq!(displayed_chain(&chain), chain);
    }
}
