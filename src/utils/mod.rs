//! Small shared helpers.
//!
//! This module provides:
//! - CSS selector parsing for the static selectors used in HTML inspection
//! - Character-safe string truncation

mod selector;
mod text;

pub use selector::parse_selector_unsafe;
pub use text::truncate_chars;
