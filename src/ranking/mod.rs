//! Rank checking for keyword/domain pairs.
//!
//! - `matcher`: finds the first search result that belongs to the target
//! - `processor`: runs one pair end to end and never fails
//! - `result`: the serialized result record
//! - `top_domains`: the leading result hosts for a keyword, without a target

mod matcher;
mod processor;
mod result;
mod top_domains;

pub use matcher::{find_ranking, RankMatch};
pub use processor::{PairRequest, RankEngine};
pub use result::{Position, RankCheckResult};
pub use top_domains::{TopDomain, TopDomainsRequest};
