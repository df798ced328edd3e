//! Error type definitions.
//!
//! This module defines the error enums returned at each component boundary and
//! the counter categories tracked by [`ProcessingStats`](super::ProcessingStats).

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Errors raised by the search provider client.
///
/// Transport and provider failures are absorbed into partial results, so the
/// only error a caller ever sees is a configuration problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("SERPER_API_KEY not configured")]
    MissingApiKey,
}

/// Errors from a single redirect resolution attempt.
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("Request failed: {0}")]
    Request(#[from] ReqwestError),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Exceeded {0} redirect hops")]
    TooManyRedirects(usize),
}

/// Errors that abort a single keyword/domain check.
///
/// These never escape the pair processor; they are logged and turned into the
/// result's `error` marker.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Rejections raised while preparing a streaming session from form input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Empty input")]
    EmptyInput,

    /// Carries the first offending keyword, shortened for display
    #[error("Invalid keyword (example): {0}")]
    InvalidKeyword(String),

    #[error("Invalid domain (example): {0}")]
    InvalidDomain(String),
}

/// Types of errors that can occur while checking rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    InvalidDomain,
    MissingApiKey,
    SearchRequestError,
    SearchApiError,
    RedirectResolutionError,
    HistoryWriteError,
    TaskTimeout,
    TaskPanicked,
}

/// Types of informational metrics recorded while checking rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpRedirect,
    MetaRefresh,
    MatchedExact,
    MatchedViaRedirect,
    Unmatched,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidDomain => "Invalid domain",
            ErrorType::MissingApiKey => "Missing API key",
            ErrorType::SearchRequestError => "Search request error",
            ErrorType::SearchApiError => "Search API error",
            ErrorType::RedirectResolutionError => "Redirect resolution error",
            ErrorType::HistoryWriteError => "History write error",
            ErrorType::TaskTimeout => "Task timeout",
            ErrorType::TaskPanicked => "Task panicked",
        }
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HttpRedirect => "HTTP redirect",
            InfoType::MetaRefresh => "Meta refresh redirect",
            InfoType::MatchedExact => "Matched (exact host)",
            InfoType::MatchedViaRedirect => "Matched (via redirect)",
            InfoType::Unmatched => "Not ranking",
        }
    }
}
