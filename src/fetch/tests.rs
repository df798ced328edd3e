// Redirect resolution tests.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

fn resolver(max_redirects: usize) -> (RedirectResolver, Arc<ProcessingStats>) {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client should build");
    let stats = Arc::new(ProcessingStats::new());
    (
        RedirectResolver::new(Arc::new(client), max_redirects, Arc::clone(&stats)),
        stats,
    )
}

fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(301).insert_header("Location", location)
}

// set_body_string would force text/plain, so the mime goes through set_body_raw
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_follow_redirect_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(redirect_to("/middle"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/middle"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/end"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/end"))
        .respond_with(html("<html>done</html>"))
        .mount(&server)
        .await;

    let (resolver, stats) = resolver(10);
    let hops = resolver
        .follow_http_redirects(&format!("{}/start", server.uri()))
        .await
        .expect("chain should resolve");

    assert_eq!(hops.final_url, format!("{}/end", server.uri()));
    assert_eq!(hops.hosts, vec!["127.0.0.1".to_string()]);
    assert_eq!(hops.response.status(), 200);
    assert_eq!(stats.get_info_count(InfoType::HttpRedirect), 2);
}

#[tokio::test]
async fn test_follow_redirects_hop_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(redirect_to("/loop"))
        .mount(&server)
        .await;

    let (resolver, _) = resolver(3);
    let result = resolver
        .follow_http_redirects(&format!("{}/loop", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(crate::error_handling::RedirectError::TooManyRedirects(3))
    ));
}

#[tokio::test]
async fn test_redirect_without_location_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let (resolver, _) = resolver(10);
    let hops = resolver
        .follow_http_redirects(&format!("{}/odd", server.uri()))
        .await
        .expect("missing Location should not fail");
    assert_eq!(hops.final_url, format!("{}/odd", server.uri()));
    assert_eq!(hops.response.status(), 302);
}

#[tokio::test]
async fn test_resolve_url_follows_one_meta_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><meta http-equiv="refresh" content="0; url=/landing"></head></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(
            r#"<html><head><meta http-equiv="refresh" content="0; url=/further"></head></html>"#,
        ))
        .mount(&server)
        .await;

    let (resolver, stats) = resolver(10);
    let resolved = resolver.resolve_url(&format!("{}/", server.uri())).await;

    // Only a single meta refresh hop is taken
    assert!(resolved.resolved);
    assert_eq!(resolved.final_url, format!("{}/landing", server.uri()));
    assert_eq!(stats.get_info_count(InfoType::MetaRefresh), 1);
}

#[tokio::test]
async fn test_meta_refresh_ignored_for_non_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<meta http-equiv="refresh" content="0; url=/landing">"#,
                "text/plain",
            ),
        )
        .mount(&server)
        .await;

    let (resolver, stats) = resolver(10);
    let resolved = resolver.resolve_url(&format!("{}/plain", server.uri())).await;
    assert_eq!(resolved.final_url, format!("{}/plain", server.uri()));
    assert_eq!(stats.get_info_count(InfoType::MetaRefresh), 0);
}

#[tokio::test]
async fn test_meta_refresh_beyond_scan_window_ignored() {
    let server = MockServer::start().await;
    let padding = "x".repeat(5000);
    Mock::given(method("GET"))
        .and(path("/long"))
        .respond_with(html(&format!(
            r#"<html><body>{padding}<meta http-equiv="refresh" content="0; url=/landing"></body></html>"#
        )))
        .mount(&server)
        .await;

    let (resolver, _) = resolver(10);
    let resolved = resolver.resolve_url(&format!("{}/long", server.uri())).await;
    assert_eq!(resolved.final_url, format!("{}/long", server.uri()));
}

#[tokio::test]
async fn test_meta_refresh_inside_scan_window_followed() {
    let server = MockServer::start().await;
    let padding = "x".repeat(3000);
    Mock::given(method("GET"))
        .and(path("/padded"))
        .respond_with(html(&format!(
            r#"<html><body>{padding}<meta http-equiv="refresh" content="0; url=/landing"></body></html>"#
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html("<html>landed</html>"))
        .mount(&server)
        .await;

    let (resolver, _) = resolver(10);
    let resolved = resolver.resolve_url(&format!("{}/padded", server.uri())).await;
    assert_eq!(resolved.final_url, format!("{}/landing", server.uri()));
}

#[tokio::test]
async fn test_resolve_url_transport_failure() {
    // Port 9 (discard) on localhost is not served in test environments
    let (resolver, stats) = resolver(10);
    let resolved = resolver.resolve_url("http://127.0.0.1:9/").await;

    assert!(!resolved.resolved);
    assert_eq!(resolved.final_url, "http://127.0.0.1:9/");
    assert!(resolved.hosts.is_empty());
    assert_eq!(stats.get_error_count(ErrorType::RedirectResolutionError), 1);
}

#[tokio::test]
async fn test_final_host_of_url_failure_is_none() {
    let (resolver, _) = resolver(10);
    assert_eq!(resolver.final_host_of_url("http://127.0.0.1:9/x").await, None);
}

#[tokio::test]
async fn test_final_host_of_url_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>"))
        .mount(&server)
        .await;

    let (resolver, _) = resolver(10);
    assert_eq!(
        resolver.final_host_of_url(&server.uri()).await,
        Some("127.0.0.1".to_string())
    );
}

#[tokio::test]
async fn test_final_host_for_unreachable_input_falls_back() {
    let (resolver, _) = resolver(10);
    // Reserved TLD never resolves
    let resolved = resolver
        .final_host_for_input("totally-absent-domain.invalid")
        .await;

    assert_eq!(resolved.final_host, "totally-absent-domain.invalid");
    assert_eq!(resolved.chain, vec!["totally-absent-domain.invalid".to_string()]);
}
