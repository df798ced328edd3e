//! HTML meta-refresh detection.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::utils::parse_selector_unsafe;

static META_HTTP_EQUIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("meta[http-equiv]", "meta refresh detection"));

/// `content="<seconds>; url=<target>"`, with optional quotes around the target.
static REFRESH_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*\d+\s*;\s*url\s*=\s*['"]?([^'">\s]+)"#)
        .expect("refresh content pattern is a valid regex")
});

/// Extracts the target of a `<meta http-equiv="refresh">` tag from an HTML prefix.
///
/// The target is resolved relative to `base_url`. Returns `None` when there is no
/// refresh tag, the tag carries no `url=` part, or the target cannot be joined.
pub fn extract_meta_refresh(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let target = document
        .select(&META_HTTP_EQUIV_SELECTOR)
        .filter(|element| {
            element
                .value()
                .attr("http-equiv")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|element| element.value().attr("content"))
        .find_map(|content| {
            REFRESH_CONTENT
                .captures(content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })?;

    let base = Url::parse(base_url).ok()?;
    base.join(&target).ok().map(|url| url.to_string())
}
