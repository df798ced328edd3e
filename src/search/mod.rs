//! Search provider client.
//!
//! Queries the Serper API page by page and assigns absolute, gap-free positions
//! to the organic results.

mod client;
mod types;

pub use client::SerperClient;
pub use types::{SearchQuery, SearchResult};

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
