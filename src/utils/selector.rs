//! CSS selector parsing utilities.

use scraper::Selector;

/// Parses a static CSS selector that must succeed.
///
/// Selectors in this crate are compile-time constants, so a parse failure is a
/// programming error and panics with the context that asked for it.
///
/// # Panics
///
/// Panics if the selector cannot be parsed.
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}
