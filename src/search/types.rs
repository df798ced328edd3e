//! Search request and response types.

use serde::{Deserialize, Serialize};

use crate::config::Device;

/// One organic search result with its absolute position (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub position: u32,
    pub url: String,
    pub title: String,
}

/// Parameters for a ranking query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub keyword: String,
    /// Location code passed as the provider's `gl`
    pub location: String,
    pub device: Device,
    pub max_results: usize,
    /// Overrides the configured API key for this query only
    pub api_key: Option<String>,
}

/// Request body for one provider page.
#[derive(Debug, Serialize)]
pub(super) struct SerperRequest<'a> {
    pub q: &'a str,
    pub gl: &'a str,
    pub hl: &'a str,
    pub device: &'a str,
    pub num: usize,
    /// 1-based page number
    pub page: usize,
    pub autocorrect: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct SerperResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SerperOrganic {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
}
