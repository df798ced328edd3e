//! HTTP redirect chain resolution.
//!
//! This module handles following redirect chains manually to track every host
//! from the initial URL to the final destination.

use std::sync::Arc;

use log::debug;
use reqwest::{StatusCode, Url};

use crate::config::META_REFRESH_SCAN_BYTES;
use crate::domain::host_of_url;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, RedirectError};

use super::meta_refresh::extract_meta_refresh;

/// Outcome of following a transport-level redirect chain.
#[derive(Debug)]
pub struct RedirectHops {
    /// URL of the terminal (non-redirect) response.
    pub final_url: String,
    /// Hosts visited in order, deduplicated.
    pub hosts: Vec<String>,
    /// The terminal response, kept so its body can be inspected.
    pub response: reqwest::Response,
}

/// A URL resolved through HTTP redirects plus at most one meta-refresh hop.
///
/// When the initial request fails, `final_url` is the input URL, `hosts` is empty
/// and `resolved` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub final_url: String,
    pub hosts: Vec<String>,
    pub resolved: bool,
}

/// Where a bare host ultimately leads, and every host seen on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub final_host: String,
    pub chain: Vec<String>,
}

/// Follows redirects for domains and search result links.
///
/// The wrapped client must have redirects disabled so each hop can be observed.
pub struct RedirectResolver {
    client: Arc<reqwest::Client>,
    max_redirects: usize,
    stats: Arc<ProcessingStats>,
}

impl RedirectResolver {
    pub fn new(
        client: Arc<reqwest::Client>,
        max_redirects: usize,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            client,
            max_redirects,
            stats,
        }
    }

    /// Follows 3xx `Location` headers from `start_url` up to `max_redirects` hops.
    ///
    /// # Errors
    ///
    /// Returns an error if any request in the chain fails, a `Location` cannot be
    /// parsed, or the hop limit is exceeded.
    pub async fn follow_http_redirects(
        &self,
        start_url: &str,
    ) -> Result<RedirectHops, RedirectError> {
        let mut hosts: Vec<String> = Vec::new();
        let mut current = Url::parse(start_url).map_err(|source| RedirectError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;

        for _ in 0..=self.max_redirects {
            push_unique(&mut hosts, host_of_url(current.as_str()));

            let resp = self.client.get(current.clone()).send().await?;
            let status = resp.status();

            if is_redirect(status) {
                if let Some(loc) = resp.headers().get(reqwest::header::LOCATION) {
                    let loc = loc.to_str().unwrap_or("").to_string();
                    let next = current
                        .join(&loc)
                        .map_err(|source| RedirectError::InvalidUrl { url: loc, source })?;
                    debug!("Redirect {} {} -> {}", status.as_u16(), current, next);
                    self.stats.increment_info(InfoType::HttpRedirect);
                    current = next;
                    continue;
                }
                log::warn!(
                    "Redirect status {} for {} but no Location header",
                    status.as_u16(),
                    current
                );
            }

            return Ok(RedirectHops {
                final_url: current.to_string(),
                hosts,
                response: resp,
            });
        }

        Err(RedirectError::TooManyRedirects(self.max_redirects))
    }

    /// Resolves a URL through HTTP redirects and at most one meta-refresh hop.
    ///
    /// Never fails: a transport failure on the first leg yields the input URL
    /// with no hosts. If the meta-refresh target itself cannot be fetched, the
    /// target URL becomes the final URL.
    pub async fn resolve_url(&self, url: &str) -> ResolvedUrl {
        let hops = match self.follow_http_redirects(url).await {
            Ok(hops) => hops,
            Err(e) => {
                debug!("Could not resolve {}: {}", url, e);
                self.stats.increment_error(ErrorType::RedirectResolutionError);
                return ResolvedUrl {
                    final_url: url.to_string(),
                    hosts: Vec::new(),
                    resolved: false,
                };
            }
        };

        let RedirectHops {
            mut final_url,
            mut hosts,
            response,
        } = hops;

        if let Some(target) = meta_refresh_target(response, &final_url).await {
            debug!("Meta refresh {} -> {}", final_url, target);
            self.stats.increment_info(InfoType::MetaRefresh);
            match self.follow_http_redirects(&target).await {
                Ok(next) => {
                    for host in next.hosts {
                        push_unique(&mut hosts, Some(host));
                    }
                    final_url = next.final_url;
                }
                Err(e) => {
                    debug!("Could not resolve meta refresh target {}: {}", target, e);
                    final_url = target;
                }
            }
        }

        ResolvedUrl {
            final_url,
            hosts,
            resolved: true,
        }
    }

    /// Finds where a bare host ultimately leads.
    ///
    /// Tries `https://host` then `http://host`, merging the hosts seen by both.
    /// The final host comes from the last candidate that resolved, falling back to
    /// the input host. The returned chain is duplicate-free and ends with the final
    /// host.
    pub async fn final_host_for_input(&self, host: &str) -> ResolvedHost {
        let mut chain: Vec<String> = Vec::new();
        let mut final_host = host.to_string();

        for candidate in [format!("https://{host}"), format!("http://{host}")] {
            let resolved = self.resolve_url(&candidate).await;
            for h in resolved.hosts {
                push_unique(&mut chain, Some(h));
            }
            if resolved.resolved {
                if let Some(h) = host_of_url(&resolved.final_url) {
                    final_host = h;
                }
            }
        }

        // The final host always terminates the chain
        chain.retain(|h| h != &final_host);
        chain.push(final_host.clone());
        ResolvedHost { final_host, chain }
    }

    /// Returns the host a full URL ultimately lands on, or `None` if it could not
    /// be resolved.
    pub async fn final_host_of_url(&self, url: &str) -> Option<String> {
        let resolved = self.resolve_url(url).await;
        if !resolved.resolved {
            return None;
        }
        host_of_url(&resolved.final_url)
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

fn push_unique(hosts: &mut Vec<String>, host: Option<String>) {
    if let Some(host) = host {
        if !hosts.contains(&host) {
            hosts.push(host);
        }
    }
}

/// Reads the start of a 200 HTML response and looks for a meta-refresh target.
async fn meta_refresh_target(mut response: reqwest::Response, base_url: &str) -> Option<String> {
    if response.status() != StatusCode::OK {
        return None;
    }
    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));
    if !is_html {
        return None;
    }

    let mut prefix: Vec<u8> = Vec::with_capacity(META_REFRESH_SCAN_BYTES);
    while prefix.len() < META_REFRESH_SCAN_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => prefix.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                debug!("Failed reading body of {}: {}", base_url, e);
                break;
            }
        }
    }
    prefix.truncate(META_REFRESH_SCAN_BYTES);

    let html = String::from_utf8_lossy(&prefix);
    extract_meta_refresh(&html, base_url)
}
