//! Shared test helpers for module tests.
//!
//! Builds engines pointed at a mock search provider so tests never touch the
//! live network.

#![cfg(test)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::ranking::RankEngine;

/// Config pointing the search client at `server` with no page delay.
pub fn test_config(server: &MockServer) -> Config {
    Config {
        search_endpoint: format!("{}/search", server.uri()),
        serper_api_key: Some("test-key".to_string()),
        page_delay_ms: 0,
        request_timeout_secs: 5,
        max_results: 10,
        ..Default::default()
    }
}

pub fn test_engine(config: &Config) -> Arc<RankEngine> {
    let stats = Arc::new(ProcessingStats::new());
    Arc::new(RankEngine::from_config(config, stats).expect("engine should build"))
}

/// A provider page whose organic links are the given URLs, in order.
pub fn organic_page(links: &[String]) -> Value {
    let organic: Vec<Value> = links
        .iter()
        .enumerate()
        .map(|(idx, link)| json!({ "title": format!("Result {}", idx + 1), "link": link }))
        .collect();
    json!({ "organic": organic })
}

/// Mounts a provider that answers every search with `body`.
pub async fn mount_search(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
