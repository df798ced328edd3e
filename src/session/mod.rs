//! Prepared streaming sessions.
//!
//! A client first posts its keyword and domain lists, which are validated and
//! stored under a random token. The streaming endpoint later redeems the token
//! for the batch parameters. Entries expire after a fixed lifetime.

mod store;
mod validation;

pub use store::SessionStore;
pub(crate) use store::new_session_token;
pub use validation::{split_lines, validate_domain_like, validate_keyword, SessionForm};
