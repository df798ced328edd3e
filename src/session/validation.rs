//! Session form parsing and input validation.

use serde::Deserialize;

use crate::batch::BatchParams;
use crate::config::{Device, MAX_DOMAIN_INPUT_CHARS, MAX_KEYWORD_INPUT_CHARS};
use crate::error_handling::ValidationError;
use crate::storage::CheckType;
use crate::utils::truncate_chars;

/// Characters rejected in keywords.
const FORBIDDEN_KEYWORD_CHARS: &[char] = &['<', '>', '\'', '"', ';', '&', '|', '`', '$'];
/// Offending inputs are echoed back shortened to this many characters.
const REJECTED_INPUT_DISPLAY_CHARS: usize = 50;

/// Form fields posted when preparing a session.
///
/// `keywords` and `domains` are newline-separated lists zipped pairwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionForm {
    pub keywords: Option<String>,
    pub domains: Option<String>,
    pub location: Option<String>,
    pub device: Option<String>,
    pub api_key: Option<String>,
}

impl SessionForm {
    /// Validates the form and builds batch parameters from it.
    ///
    /// Extra keywords or domains without a partner are dropped.
    pub fn into_params(self) -> Result<BatchParams, ValidationError> {
        let keywords = required(&self.keywords, "keywords")?;
        let domains = required(&self.domains, "domains")?;
        let device = required(&self.device, "device")?;
        let location = required(&self.location, "location")?;

        let keywords = split_lines(keywords);
        let domains = split_lines(domains);
        if keywords.is_empty() || domains.is_empty() {
            return Err(ValidationError::EmptyInput);
        }

        if let Some(bad) = keywords.iter().find(|k| !validate_keyword(k)) {
            return Err(ValidationError::InvalidKeyword(truncate_chars(
                bad,
                REJECTED_INPUT_DISPLAY_CHARS,
            )));
        }
        if let Some(bad) = domains.iter().find(|d| !validate_domain_like(d)) {
            return Err(ValidationError::InvalidDomain(truncate_chars(
                bad,
                REJECTED_INPUT_DISPLAY_CHARS,
            )));
        }

        Ok(BatchParams {
            pairs: keywords.into_iter().zip(domains).collect(),
            location: location.trim().to_string(),
            device: Device::parse_lenient(device),
            api_key: self.api_key.filter(|key| !key.trim().is_empty()),
            session_id: None,
            check_type: CheckType::Single,
        })
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

/// Splits newline-separated input into trimmed, non-blank entries.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts non-empty keywords of at most 200 characters free of shell and
/// markup metacharacters.
pub fn validate_keyword(keyword: &str) -> bool {
    !keyword.is_empty()
        && keyword.trim().chars().count() <= MAX_KEYWORD_INPUT_CHARS
        && !keyword.contains(FORBIDDEN_KEYWORD_CHARS)
}

/// Loose check applied before normalization: non-empty and at most 253 characters.
pub fn validate_domain_like(domain: &str) -> bool {
    !domain.is_empty() && domain.chars().count() <= MAX_DOMAIN_INPUT_CHARS
}
