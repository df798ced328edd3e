//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DB_PATH, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RESULTS, DEFAULT_MAX_WORKERS, DEFAULT_PAGE_DELAY_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_LANGUAGE,
    DEFAULT_SESSION_TTL_SECS, DEFAULT_TASK_TIMEOUT, DEFAULT_USER_AGENT, MAX_REDIRECT_HOPS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Device type the search provider should emulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }

    /// Parses a device name, falling back to desktop for anything unrecognized.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mobile" => Device::Mobile,
            _ => Device::Desktop,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use rank_checker::Config;
///
/// let config = Config {
///     serper_api_key: Some("key".to_string()),
///     max_workers: 4,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Search provider API key; a missing key fails every check
    pub serper_api_key: Option<String>,

    /// Search provider endpoint
    pub search_endpoint: String,

    /// Interface language sent to the provider
    pub search_language: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Worker pool size for batch runs
    pub max_workers: usize,

    /// Maximum redirect hops followed per resolution
    pub max_redirects: usize,

    /// Pairs submitted per batch chunk
    pub chunk_size: usize,

    /// Search results requested per check
    pub max_results: usize,

    /// Delay between provider page requests in milliseconds
    pub page_delay_ms: u64,

    /// Per-task result timeout for batch runs
    pub task_timeout: Duration,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Lifetime of prepared streaming sessions in seconds
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            serper_api_key: None,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_language: DEFAULT_SEARCH_LANGUAGE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_workers: DEFAULT_MAX_WORKERS,
            max_redirects: MAX_REDIRECT_HOPS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_results: DEFAULT_MAX_RESULTS,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            task_timeout: DEFAULT_TASK_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "rank_checker",
    version,
    about = "Checks where a domain ranks in search results for a keyword"
)]
pub struct Opt {
    #[command(flatten)]
    pub engine: EngineOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct EngineOpts {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    /// SQLite database file for check history
    #[arg(long, env = "RANK_CHECKER_DB_PATH", default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Serper API key
    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true, global = true)]
    pub serper_api_key: Option<String>,

    /// Search provider endpoint
    #[arg(long, env = "SERPER_ENDPOINT", default_value = DEFAULT_SEARCH_ENDPOINT, global = true)]
    pub search_endpoint: String,

    /// Interface language sent to the search provider
    #[arg(long, default_value = DEFAULT_SEARCH_LANGUAGE, global = true)]
    pub search_language: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        global = true
    )]
    pub timeout_seconds: u64,

    /// Worker pool size
    #[arg(long, env = "MAX_WORKERS", default_value_t = DEFAULT_MAX_WORKERS, global = true)]
    pub max_workers: usize,

    /// Maximum redirect hops followed per resolution
    #[arg(long, env = "MAX_REDIRECTS", default_value_t = MAX_REDIRECT_HOPS, global = true)]
    pub max_redirects: usize,

    /// Pairs submitted per batch chunk
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,

    /// Search results requested per check (at most 50 are ever fetched)
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS, global = true)]
    pub max_results: usize,

    /// Delay between provider page requests in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAGE_DELAY_MS, global = true)]
    pub page_delay_ms: u64,

    /// Per-task result timeout in seconds for batch runs
    #[arg(long, default_value_t = DEFAULT_TASK_TIMEOUT.as_secs(), global = true)]
    pub task_timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Lifetime of prepared streaming sessions in seconds
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL_SECS, global = true)]
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check keyword/domain pairs and print results as JSON lines
    Check(CheckOpts),
    /// Serve the HTTP API
    Serve(ServeOpts),
}

#[derive(Debug, Args)]
pub struct CheckOpts {
    /// Keyword to search for (repeatable, zipped with --domain)
    #[arg(long = "keyword", short = 'k')]
    pub keywords: Vec<String>,

    /// Domain to look for (repeatable, zipped with --keyword)
    #[arg(long = "domain", short = 'd')]
    pub domains: Vec<String>,

    /// File with one `keyword<TAB>domain` pair per line
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Location code (vn, hochiminh, hanoi, danang)
    #[arg(long, default_value = "vn")]
    pub location: String,

    /// Device to emulate
    #[arg(long, value_enum, default_value = "desktop")]
    pub device: Device,

    /// Do not record results in the history database
    #[arg(long)]
    pub no_history: bool,
}

#[derive(Debug, Args)]
pub struct ServeOpts {
    /// Address to bind the HTTP API to
    #[arg(long, default_value = "127.0.0.1:8001")]
    pub bind: SocketAddr,
}

impl From<&EngineOpts> for Config {
    fn from(opts: &EngineOpts) -> Self {
        Self {
            log_level: opts.log_level.clone(),
            log_format: opts.log_format.clone(),
            db_path: opts.db_path.clone(),
            serper_api_key: opts
                .serper_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            search_endpoint: opts.search_endpoint.clone(),
            search_language: opts.search_language.clone(),
            request_timeout_secs: opts.timeout_seconds,
            max_workers: opts.max_workers.max(1),
            max_redirects: opts.max_redirects,
            chunk_size: opts.chunk_size.max(1),
            max_results: opts.max_results,
            page_delay_ms: opts.page_delay_ms,
            task_timeout: Duration::from_secs(opts.task_timeout_seconds),
            user_agent: opts.user_agent.clone(),
            session_ttl_secs: opts.session_ttl_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_workers, 6);
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.max_results, 30);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.task_timeout, Duration::from_secs(60));
        assert_eq!(config.search_language, "vi");
        assert!(config.serper_api_key.is_none());
        assert_eq!(config.db_path, PathBuf::from("./rank_checker.db"));
    }

    #[test]
    fn test_device_parse_lenient() {
        assert_eq!(Device::parse_lenient("mobile"), Device::Mobile);
        assert_eq!(Device::parse_lenient(" Mobile "), Device::Mobile);
        assert_eq!(Device::parse_lenient("desktop"), Device::Desktop);
        assert_eq!(Device::parse_lenient("tablet"), Device::Desktop);
    }

    #[test]
    fn test_device_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Device::Mobile).unwrap(),
            "\"mobile\""
        );
        assert_eq!(Device::Desktop.to_string(), "desktop");
    }

    #[test]
    fn test_opt_check_subcommand() {
        let opt = Opt::parse_from([
            "rank_checker",
            "check",
            "--keyword",
            "seo tools",
            "--domain",
            "moz.com",
            "--device",
            "mobile",
        ]);
        match opt.command {
            Command::Check(check) => {
                assert_eq!(check.keywords, vec!["seo tools"]);
                assert_eq!(check.domains, vec!["moz.com"]);
                assert_eq!(check.device, Device::Mobile);
                assert_eq!(check.location, "vn");
                assert!(!check.no_history);
            }
            Command::Serve(_) => panic!("expected check subcommand"),
        }
    }

    #[test]
    fn test_config_from_opts_drops_blank_key() {
        let opt = Opt::parse_from([
            "rank_checker",
            "--serper-api-key",
            "  ",
            "--max-workers",
            "0",
            "serve",
        ]);
        let config = Config::from(&opt.engine);
        assert!(config.serper_api_key.is_none());
        // Zero workers would deadlock the pool
        assert_eq!(config.max_workers, 1);
    }
}
