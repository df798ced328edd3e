//! Serper API client with pagination.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{Config, MAX_KEYWORD_CHARS, SEARCH_MAX_PAGES, SEARCH_PAGE_SIZE};
use crate::error_handling::{ErrorType, ProcessingStats, SearchError};
use crate::utils::truncate_chars;

use super::types::{SearchQuery, SearchResult, SerperRequest, SerperResponse};

/// Paginating client for the Serper search API.
///
/// The provider returns at most [`SEARCH_PAGE_SIZE`] results per call, so a query
/// for N results issues up to `ceil(N / 10)` calls, never more than
/// [`SEARCH_MAX_PAGES`].
pub struct SerperClient {
    client: Arc<reqwest::Client>,
    endpoint: String,
    api_key: Option<String>,
    language: String,
    page_delay: Duration,
    stats: Arc<ProcessingStats>,
}

impl SerperClient {
    pub fn new(client: Arc<reqwest::Client>, config: &Config, stats: Arc<ProcessingStats>) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint.clone(),
            api_key: config.serper_api_key.clone(),
            language: config.search_language.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
            stats,
        }
    }

    /// Fetches up to `query.max_results` organic results.
    ///
    /// Positions are assigned as `page * 10 + index + 1` regardless of what the
    /// provider reports. Pagination stops early on an empty page or a provider
    /// error payload. Transport and decoding failures end pagination too; the
    /// pages collected so far are returned.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingApiKey`] when neither the query nor the
    /// client configuration carries an API key.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = query
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .or(self.api_key.as_deref())
            .ok_or_else(|| {
                self.stats.increment_error(ErrorType::MissingApiKey);
                SearchError::MissingApiKey
            })?;

        let keyword = truncate_chars(&query.keyword, MAX_KEYWORD_CHARS);
        let max_pages = query
            .max_results
            .div_ceil(SEARCH_PAGE_SIZE)
            .min(SEARCH_MAX_PAGES);
        let mut results: Vec<SearchResult> = Vec::new();

        for page in 0..max_pages {
            if page > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let start = page * SEARCH_PAGE_SIZE;
            info!(
                "Search: {} | page={} | positions {}-{} | location={}",
                keyword,
                page + 1,
                start + 1,
                start + SEARCH_PAGE_SIZE,
                query.location
            );

            let request = SerperRequest {
                q: &keyword,
                gl: &query.location,
                hl: &self.language,
                device: query.device.as_str(),
                num: SEARCH_PAGE_SIZE,
                page: page + 1,
                autocorrect: false,
            };

            let data = match self.fetch_page(api_key, &request).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("Search request failed for '{}' (page {}): {}", keyword, page + 1, e);
                    self.stats.increment_error(ErrorType::SearchRequestError);
                    break;
                }
            };

            if let Some(error) = data.error {
                warn!("Search provider error for '{}': {}", keyword, error);
                self.stats.increment_error(ErrorType::SearchApiError);
                break;
            }

            if data.organic.is_empty() {
                debug!("Page {} returned no results, stopping pagination", page + 1);
                break;
            }

            let found = data.organic.len();
            results.extend(data.organic.into_iter().enumerate().map(|(idx, item)| {
                SearchResult {
                    position: u32::try_from(start + idx + 1).unwrap_or(u32::MAX),
                    url: item.link,
                    title: item.title,
                }
            }));
            debug!(
                "Page {} returned {} results (total: {})",
                page + 1,
                found,
                results.len()
            );

            if results.len() >= query.max_results {
                break;
            }
        }

        results.truncate(query.max_results);
        info!("Search total: {} results for '{}'", results.len(), keyword);
        Ok(results)
    }

    async fn fetch_page(
        &self,
        api_key: &str,
        request: &SerperRequest<'_>,
    ) -> Result<SerperResponse, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<SerperResponse>()
            .await
    }
}
