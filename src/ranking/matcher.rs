//! Matching a target host against ordered search results.

use std::future::Future;

use log::debug;

use crate::config::REDIRECT_CHECK_WINDOW;
use crate::domain::host_of_url;
use crate::search::SearchResult;

/// The first search result that belongs to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMatch {
    pub position: u32,
    pub url: String,
    /// Host displayed in the search result (before any redirect resolution)
    pub ranking_host: Option<String>,
    /// True when the match was only found by following the result's redirects
    pub via_redirect: bool,
}

/// Scans `results` in order and returns the first one that leads to `target`.
///
/// A result matches when its host equals `target` or appears in `chain`. For the
/// first [`REDIRECT_CHECK_WINDOW`] results that don't match directly, `resolve`
/// is called with the result link to learn its final host, which is compared the
/// same way. Results without a link are skipped but still count towards the
/// window.
pub async fn find_ranking<F, Fut>(
    target: &str,
    chain: &[String],
    results: &[SearchResult],
    resolve: F,
) -> Option<RankMatch>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let belongs = |host: &str| host == target || chain.iter().any(|h| h == host);

    for (idx, item) in results.iter().enumerate() {
        if item.url.is_empty() {
            continue;
        }

        let host = host_of_url(&item.url);
        debug!(
            "[#{}] Checking {} | {}",
            item.position,
            host.as_deref().unwrap_or(""),
            item.url
        );

        if host.as_deref().is_some_and(belongs) {
            return Some(RankMatch {
                position: item.position,
                url: item.url.clone(),
                ranking_host: host,
                via_redirect: false,
            });
        }

        if idx < REDIRECT_CHECK_WINDOW {
            if let Some(final_host) = resolve(item.url.clone()).await {
                debug!("[#{}] After redirect: {}", item.position, final_host);
                if belongs(&final_host) {
                    return Some(RankMatch {
                        position: item.position,
                        url: item.url.clone(),
                        ranking_host: host,
                        via_redirect: true,
                    });
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn results(links: &[&str]) -> Vec<SearchResult> {
        links
            .iter()
            .enumerate()
            .map(|(idx, link)| SearchResult {
                position: idx as u32 + 1,
                url: link.to_string(),
                title: format!("Result {}", idx + 1),
            })
            .collect()
    }

    async fn no_redirects(_: String) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn test_exact_match_first_wins() {
        let serp = results(&[
            "https://a.example/",
            "https://www.moz.com/learn",
            "https://moz.com/blog",
        ]);
        let found = find_ranking("moz.com", &["moz.com".to_string()], &serp, no_redirects)
            .await
            .unwrap();

        assert_eq!(found.position, 2);
        assert_eq!(found.url, "https://www.moz.com/learn");
        assert_eq!(found.ranking_host.as_deref(), Some("moz.com"));
        assert!(!found.via_redirect);
    }

    #[tokio::test]
    async fn test_match_through_chain_member() {
        let serp = results(&["https://a.example/", "https://old-brand.example/page"]);
        let chain = vec!["old-brand.example".to_string(), "new-brand.example".to_string()];
        let found = find_ranking("new-brand.example", &chain, &serp, no_redirects)
            .await
            .unwrap();
        assert_eq!(found.position, 2);
        assert_eq!(found.ranking_host.as_deref(), Some("old-brand.example"));
    }

    #[tokio::test]
    async fn test_redirect_match_reports_serp_host() {
        let serp = results(&["https://a.example/", "https://short.example/abc"]);
        let redirects: HashMap<String, String> = [(
            "https://short.example/abc".to_string(),
            "target.example".to_string(),
        )]
        .into_iter()
        .collect();

        let found = find_ranking("target.example", &[], &serp, |link| {
            let dest = redirects.get(&link).cloned();
            async move { dest }
        })
        .await
        .unwrap();

        assert_eq!(found.position, 2);
        assert_eq!(found.ranking_host.as_deref(), Some("short.example"));
        assert!(found.via_redirect);
    }

    #[tokio::test]
    async fn test_redirect_check_limited_to_top_ten() {
        let links: Vec<String> = (1..=15)
            .map(|i| format!("https://site{i}.example/"))
            .collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let serp = results(&link_refs);
        let calls = Arc::new(AtomicUsize::new(0));

        let found = find_ranking("target.example", &[], &serp, |link| {
            calls.fetch_add(1, Ordering::SeqCst);
            // site12 redirects to the target but sits outside the window
            let dest = if link.contains("site12") {
                Some("target.example".to_string())
            } else {
                None
            };
            async move { dest }
        })
        .await;

        assert_eq!(found, None);
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_exact_match_beyond_window_still_found() {
        let links: Vec<String> = (1..=25)
            .map(|i| format!("https://site{i}.example/"))
            .collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let serp = results(&link_refs);

        let found = find_ranking("site22.example", &[], &serp, no_redirects)
            .await
            .unwrap();
        assert_eq!(found.position, 22);
    }

    #[tokio::test]
    async fn test_empty_links_are_skipped() {
        let serp = results(&["", "https://moz.com/"]);
        let found = find_ranking("moz.com", &[], &serp, no_redirects)
            .await
            .unwrap();
        assert_eq!(found.position, 2);
    }

    #[tokio::test]
    async fn test_no_match() {
        let serp = results(&["https://a.example/", "https://b.example/"]);
        let found = find_ranking("moz.com", &["moz.com".to_string()], &serp, no_redirects).await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_subdomain_is_not_a_match() {
        // Exact host comparison only
        let serp = results(&["https://blog.moz.com/post"]);
        let found = find_ranking("moz.com", &[], &serp, no_redirects).await;
        assert!(found.is_none());
    }
}
