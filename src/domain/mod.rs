//! Host normalization utilities.
//!
//! Key functions:
//! - `normalize_host()` - Canonicalizes a raw domain or URL into a validated hostname
//! - `host_of_url()` - Extracts the comparable host of a full link (no validation)
//!
//! Both strip a leading `www.` and any port so that hosts taken from user input,
//! redirect chains and search results compare equal.

use std::sync::LazyLock;

use regex::Regex;

/// Accepted hostname shape after normalization.
static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9\-._]*[a-z0-9]$").expect("host pattern is a valid regex")
});

/// A lowercase hostname with no scheme, no leading `www.` and no port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedHost(String);

impl NormalizedHost {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NormalizedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw domain or URL string to a clean hostname.
///
/// Inputs starting with `http://` or `https://` are parsed as URLs and their host
/// is used; anything else is cut at the first `/`. The result is lowercased,
/// stripped of a leading `www.` and a trailing `:port`, then validated.
///
/// Returns `None` for empty, unparseable or malformed input. No DNS lookup is
/// performed, so any well-formed name is accepted.
///
/// # Examples
///
/// ```
/// use rank_checker::normalize_host;
///
/// let host = normalize_host("https://WWW.Example.com:443/x").unwrap();
/// assert_eq!(host.as_str(), "example.com");
/// assert!(normalize_host("!!!").is_none());
/// ```
pub fn normalize_host(raw: &str) -> Option<NormalizedHost> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let host = if raw.starts_with("http://") || raw.starts_with("https://") {
        let parsed = url::Url::parse(raw).ok()?;
        parsed.host_str()?.to_string()
    } else {
        let authority = raw.split('/').next().unwrap_or_default();
        strip_port(authority).to_string()
    };

    let host = canonicalize(&host);
    if HOST_PATTERN.is_match(&host) {
        Some(NormalizedHost(host))
    } else {
        None
    }
}

/// Extracts the host of a full link, lowercased, without `www.` or port.
///
/// Unlike [`normalize_host`] the result is not validated against the hostname
/// pattern; it is only meant for comparing against normalized hosts. Returns
/// `None` when the link cannot be parsed or has no host.
pub fn host_of_url(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link.trim()).ok()?;
    let host = canonicalize(parsed.host_str()?);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Lowercases a host and strips leading `www.` labels.
///
/// Repeated `www.` prefixes are all removed so normalizing twice is a no-op.
fn canonicalize(host: &str) -> String {
    let lowered = host.to_lowercase();
    let mut without_www = lowered.as_str();
    while let Some(rest) = without_www.strip_prefix("www.") {
        without_www = rest;
    }
    without_www.to_string()
}

/// Drops a trailing `:port` from an authority that was not parsed as a URL.
fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or_default()
}
