// Batch runner tests against a mock provider.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::ranking::Position;
use crate::test_helpers::{mount_search, organic_page, test_config, test_engine};

fn pairs(keywords: &[&str], domain: &str) -> Vec<(String, String)> {
    keywords
        .iter()
        .map(|k| (k.to_string(), domain.to_string()))
        .collect()
}

fn params(pairs: Vec<(String, String)>) -> BatchParams {
    BatchParams {
        pairs,
        location: "vn".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_batch_yields_one_result_per_pair() {
    let server = MockServer::start().await;
    mount_search(&server, organic_page(&[format!("{}/landing", server.uri())])).await;

    let engine = test_engine(&test_config(&server));
    let runner = BatchRunner::with_limits(engine, 2, 3, Duration::from_secs(30));
    let keywords = ["a", "b", "c", "d", "e", "f", "g"];

    let mut seen = Vec::new();
    let summary = runner
        .run_batch(&params(pairs(&keywords, "127.0.0.1")), |result| {
            seen.push(result)
        })
        .await;

    assert_eq!(seen.len(), keywords.len());
    assert_eq!(summary.total, keywords.len());
    assert_eq!(summary.ranked, keywords.len());
    assert_eq!(summary.failed, 0);

    let mut returned: Vec<&str> = seen.iter().map(|r| r.keyword.as_str()).collect();
    returned.sort_unstable();
    assert_eq!(returned, keywords);
    assert!(seen.iter().all(|r| r.position == Position::Ranked(1)));
}

#[tokio::test]
async fn test_batch_reports_invalid_domains_inline() {
    let server = MockServer::start().await;
    mount_search(&server, organic_page(&[format!("{}/landing", server.uri())])).await;

    let engine = test_engine(&test_config(&server));
    let runner = BatchRunner::with_limits(engine, 4, 200, Duration::from_secs(30));
    let mut input = pairs(&["good"], "127.0.0.1");
    input.push(("bad".to_string(), "!!!".to_string()));

    let mut seen = Vec::new();
    let summary = runner.run_batch(&params(input), |r| seen.push(r)).await;

    assert_eq!(seen.len(), 2);
    assert_eq!(summary.failed, 1);
    let bad = seen.iter().find(|r| r.keyword == "bad").unwrap();
    assert_eq!(bad.error.as_deref(), Some("Processing failed"));
    assert_eq!(bad.position, Position::NotFound);
    assert_eq!(bad.domain, "!!!");
}

#[tokio::test]
async fn test_batch_results_arrive_in_completion_order() {
    let server = MockServer::start().await;
    let body = organic_page(&[format!("{}/landing", server.uri())]);
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "q": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body.clone())
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "q": "fast" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let engine = test_engine(&test_config(&server));
    let runner = BatchRunner::with_limits(engine, 2, 200, Duration::from_secs(30));

    let mut order = Vec::new();
    runner
        .run_batch(&params(pairs(&["slow", "fast"], "127.0.0.1")), |r| {
            order.push(r.keyword)
        })
        .await;

    assert_eq!(order, vec!["fast".to_string(), "slow".to_string()]);
}

#[tokio::test]
async fn test_batch_timeout_yields_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(organic_page(&[]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let engine = test_engine(&test_config(&server));
    let runner = BatchRunner::with_limits(Arc::clone(&engine), 2, 200, Duration::from_millis(300));

    let mut seen = Vec::new();
    let summary = runner
        .run_batch(&params(pairs(&["k1", "k2"], "127.0.0.1")), |r| seen.push(r))
        .await;

    assert_eq!(seen.len(), 2);
    assert_eq!(summary.failed, 2);
    for result in &seen {
        assert_eq!(result.error.as_deref(), Some("Processing failed"));
        assert_eq!(result.position, Position::NotFound);
        assert_eq!(result.url, "-");
        assert_eq!(result.domain, "127.0.0.1");
    }
    assert_eq!(engine.stats().get_error_count(ErrorType::TaskTimeout), 2);
}

#[tokio::test]
async fn test_stream_batch_ends_with_summary() {
    let server = MockServer::start().await;
    // Same mock server under another host name, so it never matches the target
    let elsewhere = format!("http://localhost:{}/", server.address().port());
    mount_search(&server, organic_page(&[elsewhere])).await;

    let engine = test_engine(&test_config(&server));
    let runner = BatchRunner::with_limits(engine, 3, 2, Duration::from_secs(30));

    let mut rx = runner.stream_batch(params(pairs(&["x", "y", "z"], "127.0.0.1")));
    let mut results = 0;
    let mut end = None;
    while let Some(event) = rx.recv().await {
        match event {
            BatchEvent::Result(result) => {
                assert!(end.is_none(), "result delivered after end");
                assert_eq!(result.position, Position::NotFound);
                results += 1;
            }
            BatchEvent::End(summary) => end = Some(summary),
        }
    }

    assert_eq!(results, 3);
    let summary = end.expect("stream should end with a summary");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.ranked, 0);
}

#[tokio::test]
async fn test_empty_batch_still_ends() {
    let server = MockServer::start().await;
    let runner = BatchRunner::with_limits(
        test_engine(&test_config(&server)),
        1,
        10,
        Duration::from_secs(1),
    );

    let mut rx = runner.stream_batch(params(Vec::new()));
    match rx.recv().await {
        Some(BatchEvent::End(summary)) => assert_eq!(summary.total, 0),
        other => panic!("expected end event, got {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_dropped_receiver_stops_remaining_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(organic_page(&[format!("{}/landing", server.uri())]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let runner = BatchRunner::with_limits(
        test_engine(&test_config(&server)),
        1,
        1,
        Duration::from_secs(30),
    );
    let keywords = ["k1", "k2", "k3", "k4", "k5", "k6"];
    let mut rx = runner.stream_batch(params(pairs(&keywords, "127.0.0.1")));

    match rx.recv().await {
        Some(BatchEvent::Result(result)) => assert_eq!(result.position, Position::Ranked(1)),
        other => panic!("expected a result, got {other:?}"),
    }
    drop(rx);

    // Long enough for every remaining chunk to run if the batch kept going
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let searches = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/search")
        .count();
    assert!(
        searches <= 2,
        "{searches} searches issued after the receiver was dropped"
    );
}

#[tokio::test]
async fn test_cancelled_batch_stops_before_next_chunk() {
    let server = MockServer::start().await;
    mount_search(&server, organic_page(&[format!("{}/landing", server.uri())])).await;

    let runner = BatchRunner::with_limits(
        test_engine(&test_config(&server)),
        2,
        2,
        Duration::from_secs(30),
    );
    let cancel = CancellationToken::new();
    let mut seen = Vec::new();
    let summary = runner
        .run_batch_until(&params(pairs(&["a", "b", "c", "d", "e"], "127.0.0.1")), &cancel, |r| {
            seen.push(r);
            cancel.cancel();
        })
        .await;

    assert!(summary.cancelled);
    assert_eq!(summary.total, 5);
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_progress_counters() {
    let progress = BatchProgress::new(3);
    progress.mark_completed();
    progress.mark_completed();
    assert_eq!(progress.completed(), 2);
    assert_eq!(progress.total(), 3);
}
