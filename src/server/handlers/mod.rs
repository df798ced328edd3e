//! HTTP handlers.

mod bulk;
mod history;
mod status;
mod stream;

pub use bulk::bulk_check_handler;
pub use history::{all_history_handler, daily_history_handler, sessions_handler};
pub use status::{health_handler, status_handler};
pub use stream::{save_session_handler, stream_handler};
