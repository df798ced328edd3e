//! rank_checker library: search ranking checks for keyword/domain pairs
//!
//! This library finds where a domain ranks in search results for a keyword.
//! Target domains are resolved through their HTTP and meta-refresh redirects
//! so that a result pointing at any host in the chain counts as a match, and
//! the leading results are themselves resolved to catch listings that redirect
//! onto the target.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rank_checker::{Config, Device, ProcessingStats, RankEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     serper_api_key: Some("your-key".to_string()),
//!     ..Default::default()
//! };
//! let engine = RankEngine::from_config(&config, Arc::new(ProcessingStats::new()))?;
//!
//! let result = engine
//!     .process_pair("seo tools", "moz.com", "vn", Device::Desktop)
//!     .await;
//! println!("{} ranks at {}", result.domain, result.position);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod batch;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod ranking;
mod run;
pub mod search;
pub mod server;
pub mod session;
pub mod storage;
mod utils;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use batch::{BatchEvent, BatchParams, BatchRunner, BatchSummary};
pub use config::{Config, Device, LogFormat, LogLevel};
pub use domain::{host_of_url, normalize_host, NormalizedHost};
pub use error_handling::ProcessingStats;
pub use ranking::{Position, RankCheckResult, RankEngine};
pub use run::{build_engine, load_pairs, parse_pair_lines, run_checks, run_server};
pub use storage::{run_migrations, CheckType, HistoryStore};
