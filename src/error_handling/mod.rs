//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error enums for each component boundary (initialization, database,
//!   search provider, redirect resolution, single checks, session input)
//! - Processing statistics tracking (errors and info metrics)
//!
//! Counters are categorized into:
//! - **Errors**: Failures that degraded a check (invalid input, provider or
//!   network trouble, history writes, task timeouts)
//! - **Info**: Notable events (redirects followed, how a match was found)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    CheckError, DatabaseError, ErrorType, InfoType, InitializationError, RedirectError,
    SearchError, ValidationError,
};
