//! Configuration constants.
//!
//! This module defines the fixed operational parameters of the ranking engine:
//! provider paging limits, redirect bounds, output caps and timeouts.

use std::time::Duration;

/// Default worker count for the batch pool.
pub const DEFAULT_MAX_WORKERS: usize = 6;
/// Default number of pairs materialized per batch chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 200;
/// Default per-request timeout in seconds (redirect resolution and provider calls)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Per-task result timeout for batch runs
/// Covers redirect resolution for the target (two candidates), up to five
/// provider pages and up to ten redirect checks of search results.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(60);
pub const DB_PATH: &str = "./rank_checker.db";
/// Seconds between progress log lines during CLI runs
pub const LOGGING_INTERVAL: u64 = 5;

/// Identifying User-Agent sent with every outbound request.
///
/// Redirect resolution and provider queries both identify themselves with this
/// fixed signature. Users can override it via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SERPChecker/0.2)";

// Search provider
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
/// Interface language sent to the provider (`hl`)
pub const DEFAULT_SEARCH_LANGUAGE: &str = "vi";
/// Results returned by the provider per page
pub const SEARCH_PAGE_SIZE: usize = 10;
/// Hard ceiling on pages fetched per query (so at most 50 results)
pub const SEARCH_MAX_PAGES: usize = 5;
/// Default number of results requested per check
pub const DEFAULT_MAX_RESULTS: usize = 30;
/// Keywords are truncated to this many characters before querying
pub const MAX_KEYWORD_CHARS: usize = 100;
/// Delay between successive page requests in milliseconds
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;

// Redirect handling
/// Maximum number of redirect hops to follow
/// Exceeding this is treated as a transport failure
pub const MAX_REDIRECT_HOPS: usize = 10;
/// Only this many leading bytes of an HTML body are scanned for meta refresh
pub const META_REFRESH_SCAN_BYTES: usize = 4096;

// Matching and output
/// Only the first N search results are checked via redirect resolution
pub const REDIRECT_CHECK_WINDOW: usize = 10;
/// Redirect chains are truncated to this many hosts in result records
pub const MAX_CHAIN_OUTPUT: usize = 10;
/// Matched URLs are truncated to this many characters in result records
pub const MAX_URL_OUTPUT_CHARS: usize = 200;
/// Marker used for the position of an unmatched pair
pub const POSITION_NOT_FOUND: &str = "N/A";
/// Marker used for the URL of an unmatched pair
pub const URL_NOT_FOUND: &str = "-";
/// Error marker placed on results that could not be resolved
pub const PROCESSING_FAILED: &str = "Processing failed";

// Result timestamps
/// Civil-time offset used for `checked_at` (UTC+7)
pub const CHECKED_AT_OFFSET_SECS: i32 = 7 * 3600;
pub const CHECKED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Location codes accepted by the provider and their display labels.
pub const LOCATIONS: &[(&str, &str)] = &[
    ("vn", "Việt Nam"),
    ("hochiminh", "TP. Hồ Chí Minh"),
    ("hanoi", "Hà Nội"),
    ("danang", "Đà Nẵng"),
];
/// Display label for location codes missing from [`LOCATIONS`]
pub const UNKNOWN_LOCATION: &str = "unknown";

// Input validation
/// Maximum keyword length accepted when preparing a session
pub const MAX_KEYWORD_INPUT_CHARS: usize = 200;
/// Maximum domain length accepted when preparing a session
pub const MAX_DOMAIN_INPUT_CHARS: usize = 253;

// Sessions
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

// Bulk top-domain listings
/// Results requested per keyword, so enough usable links remain after filtering
pub const BULK_SEARCH_RESULTS: usize = 50;
pub const DEFAULT_BULK_LIMIT: usize = 30;
pub const MAX_BULK_LIMIT: usize = 100;
/// Stored URLs of bulk listings are cut to this many characters
pub const MAX_BULK_URL_CHARS: usize = 500;

/// Returns the display label for a location code.
pub fn location_display(code: &str) -> &'static str {
    LOCATIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_LOCATION)
}
