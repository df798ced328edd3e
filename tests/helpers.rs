// Shared test helpers for integration tests.
//
// Every helper points the engine at a local mock provider, so no test talks to
// the real search API.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rank_checker::storage::init_db_pool_with_path;
use rank_checker::{run_migrations, Config, HistoryStore, ProcessingStats, RankEngine};

/// Config aimed at the mock provider, with no page delay.
#[allow(dead_code)] // Used by other test files
pub fn mock_config(server: &MockServer) -> Config {
    Config {
        search_endpoint: format!("{}/search", server.uri()),
        serper_api_key: Some("integration-key".to_string()),
        page_delay_ms: 0,
        request_timeout_secs: 5,
        max_results: 10,
        ..Default::default()
    }
}

/// A URL on the mock server under the `localhost` name.
///
/// Its host never equals `127.0.0.1`, the target used in most tests, but
/// resolving it stays on the local machine.
#[allow(dead_code)]
pub fn other_host_url(server: &MockServer, path: &str) -> String {
    format!("http://localhost:{}{}", server.address().port(), path)
}

/// Provider page body listing `links` as organic results.
#[allow(dead_code)]
pub fn organic(links: &[String]) -> Value {
    let organic: Vec<Value> = links
        .iter()
        .enumerate()
        .map(|(idx, link)| json!({ "title": format!("Result {}", idx + 1), "link": link }))
        .collect();
    json!({ "organic": organic })
}

/// Answers provider page `page` (1-based) with `body`.
#[allow(dead_code)]
pub async fn mount_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "page": page })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn engine(config: &Config) -> Arc<RankEngine> {
    Arc::new(
        RankEngine::from_config(config, Arc::new(ProcessingStats::new()))
            .expect("engine should build"),
    )
}

/// Engine recording history in a fresh SQLite file.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
#[allow(dead_code)]
pub async fn engine_with_history(config: &Config) -> (Arc<RankEngine>, HistoryStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_db_pool_with_path(&dir.path().join("history.db"))
        .await
        .expect("Failed to create test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let store = HistoryStore::new(pool);
    let engine = RankEngine::from_config(config, Arc::new(ProcessingStats::new()))
        .expect("engine should build")
        .with_history(store.clone());
    (Arc::new(engine), store, dir)
}
