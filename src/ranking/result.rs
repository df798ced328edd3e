//! Result record for a single keyword/domain check.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{
    location_display, CHECKED_AT_FORMAT, CHECKED_AT_OFFSET_SECS, PROCESSING_FAILED,
    POSITION_NOT_FOUND, URL_NOT_FOUND,
};

/// Absolute search position, or not found.
///
/// Serialized as an integer when ranked and as `"N/A"` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Ranked(u32),
    #[default]
    NotFound,
}

impl Position {
    pub fn as_option(&self) -> Option<u32> {
        match self {
            Position::Ranked(p) => Some(*p),
            Position::NotFound => None,
        }
    }
}

impl From<Option<u32>> for Position {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Position::NotFound, Position::Ranked)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Ranked(p) => write!(f, "{p}"),
            Position::NotFound => f.write_str(POSITION_NOT_FOUND),
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Position::Ranked(p) => serializer.serialize_u32(*p),
            Position::NotFound => serializer.serialize_str(POSITION_NOT_FOUND),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(p) => Ok(Position::Ranked(p)),
            Raw::Text(s) if s == POSITION_NOT_FOUND => Ok(Position::NotFound),
            Raw::Text(s) => s
                .parse::<u32>()
                .map(Position::Ranked)
                .map_err(|_| serde::de::Error::custom(format!("invalid position: {s}"))),
        }
    }
}

/// Outcome of checking one keyword/domain pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCheckResult {
    pub keyword: String,
    /// Domain exactly as the caller supplied it
    pub domain: String,
    pub position: Position,
    /// Matched link (at most 200 characters), or `-`
    pub url: String,
    /// Hosts the target domain redirects through, at most 10
    pub redirect_chain: Vec<String>,
    /// `DD/MM/YYYY HH:MM:SS` in UTC+7
    pub checked_at: String,
    pub location_display: String,
    pub error: Option<String>,
    /// Host shown in the search result that matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_host: Option<String>,
}

impl RankCheckResult {
    /// An unmatched record for `keyword`/`domain` stamped with the current time.
    pub fn unmatched(keyword: &str, domain: &str, location: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            domain: domain.to_string(),
            position: Position::NotFound,
            url: URL_NOT_FOUND.to_string(),
            redirect_chain: Vec::new(),
            checked_at: format_checked_at(Utc::now()),
            location_display: location_display(location).to_string(),
            error: None,
            ranking_host: None,
        }
    }

    /// Placeholder for a pair whose check timed out or crashed.
    pub fn failed(keyword: &str, domain: &str, location: &str) -> Self {
        Self {
            error: Some(PROCESSING_FAILED.to_string()),
            ..Self::unmatched(keyword, domain, location)
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self.position, Position::Ranked(_))
    }
}

/// Formats a timestamp in the fixed UTC+7 civil time used for `checked_at`.
pub fn format_checked_at(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(CHECKED_AT_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).format(CHECKED_AT_FORMAT).to_string(),
        None => now.format(CHECKED_AT_FORMAT).to_string(),
    }
}
