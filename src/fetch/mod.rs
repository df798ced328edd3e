//! Redirect resolution.
//!
//! This module follows transport-level redirect chains manually (the client has
//! redirects disabled) so every intermediate host can be recorded, then looks
//! for a single HTML meta-refresh hop on the terminal response.

mod meta_refresh;
mod redirects;

pub use meta_refresh::extract_meta_refresh;
pub use redirects::{RedirectHops, RedirectResolver, ResolvedHost, ResolvedUrl};
