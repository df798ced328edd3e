// storage/mod.rs
// Database operations module

pub mod history;
pub mod migrations;
pub mod pool;

// Re-export commonly used items
pub use history::{
    CheckType, HistoryFilter, HistoryRecord, HistoryStore, SessionPage, SessionSummary,
    DEFAULT_HISTORY_LIMIT,
};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
