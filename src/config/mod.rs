//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (paging, redirect bounds, output caps, timeouts)
//! - The location code table
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    CheckOpts, Command, Config, Device, EngineOpts, LogFormat, LogLevel, Opt, ServeOpts,
};
