//! Keyword/domain pair input for CLI runs.

use anyhow::{Context, Result};
use log::warn;

use crate::config::CheckOpts;

/// Collects pairs from repeated `--keyword`/`--domain` flags followed by the
/// pairs file, if any.
pub async fn load_pairs(opts: &CheckOpts) -> Result<Vec<(String, String)>> {
    if opts.keywords.len() != opts.domains.len() {
        warn!(
            "Got {} keywords and {} domains; unpaired entries are ignored",
            opts.keywords.len(),
            opts.domains.len()
        );
    }

    let mut pairs: Vec<(String, String)> = opts
        .keywords
        .iter()
        .zip(&opts.domains)
        .map(|(k, d)| (k.trim().to_string(), d.trim().to_string()))
        .filter(|(k, d)| !k.is_empty() && !d.is_empty())
        .collect();

    if let Some(path) = &opts.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read pairs file {}", path.display()))?;
        pairs.extend(parse_pair_lines(&text));
    }

    Ok(pairs)
}

/// Parses `keyword<TAB>domain` lines. Blank lines and `#` comments are skipped.
pub fn parse_pair_lines(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('\t') {
            Some((keyword, domain)) if !keyword.trim().is_empty() && !domain.trim().is_empty() => {
                pairs.push((keyword.trim().to_string(), domain.trim().to_string()));
            }
            _ => warn!("Skipping line {}: expected keyword<TAB>domain", idx + 1),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Device;
    use std::io::Write;

    fn opts(keywords: &[&str], domains: &[&str]) -> CheckOpts {
        CheckOpts {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            domains: domains.iter().map(|s| s.to_string()).collect(),
            file: None,
            location: "vn".to_string(),
            device: Device::Desktop,
            no_history: true,
        }
    }

    #[test]
    fn test_parse_pair_lines() {
        let text = "# keyword\tdomain\nseo tools\tmoz.com\n\n  backlinks \t ahrefs.com \nno tab here\n\tmissing.com\n";
        assert_eq!(
            parse_pair_lines(text),
            vec![
                ("seo tools".to_string(), "moz.com".to_string()),
                ("backlinks".to_string(), "ahrefs.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_pairs_zips_flags() {
        let pairs = load_pairs(&opts(&["a", "b", "c"], &["x.com", "y.com"]))
            .await
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "x.com".to_string()),
                ("b".to_string(), "y.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_pairs_appends_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from file\tmoz.com").unwrap();

        let mut with_file = opts(&["flag"], &["x.com"]);
        with_file.file = Some(file.path().to_path_buf());

        let pairs = load_pairs(&with_file).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "from file");
    }

    #[tokio::test]
    async fn test_load_pairs_missing_file() {
        let mut missing = opts(&[], &[]);
        missing.file = Some("/nonexistent/pairs.tsv".into());
        let err = load_pairs(&missing).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read pairs file"));
    }
}
