use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use crate::{MetaError, Result};

/// Caller-owned tally of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_urls: Vec<String>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, url: &str, success: bool) {
        self.processed += 1;
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            self.failed_urls.push(url.to_string());
        }
    }
}

/// Read URLs from the `url` column of a CSV file. Blank cells are skipped.
pub fn read_batch_urls(path: &Path) -> Result<Vec<String>> {
    let content = fs_err::read_to_string(path).context("Failed to read batch file")?;
    parse_batch_csv(&content)
}

fn parse_batch_csv(content: &str) -> Result<Vec<String>> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| MetaError::InputUnavailable("Batch file is empty".to_string()))?;

    let url_column = split_row(header)
        .iter()
        .position(|column| column.eq_ignore_ascii_case("url"))
        .ok_or_else(|| MetaError::InputUnavailable("Batch file has no 'url' column".to_string()))?;

    let urls = lines
        .filter_map(|line| split_row(line).get(url_column).cloned())
        .filter(|url| !url.is_empty())
        .collect();

    Ok(urls)
}

/// Split a CSV row; fields may be wrapped in double quotes, with `""` as an escaped quote
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.next_if_eq(&'"').is_some() => current.push('"'),
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    fields.into_iter().map(|field| field.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = BatchStats::new();
        stats.record("https://youtu.be/aaaaaaaaaaa", true);
        stats.record("https://youtu.be/bbbbbbbbbbb", false);

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failed_urls, vec!["https://youtu.be/bbbbbbbbbbb"]);
    }

    #[test]
    fn test_parse_batch_csv_picks_url_column() {
        let csv = "name,URL\nfirst,https://youtu.be/aaaaaaaaaaa\nsecond,\n\"third, quoted\",\"https://youtu.be/ccccccccccc\"\n";
        let urls = parse_batch_csv(csv).unwrap();

        assert_eq!(
            urls,
            vec!["https://youtu.be/aaaaaaaaaaa", "https://youtu.be/ccccccccccc"]
        );
    }

    #[test]
    fn test_split_row_unescapes_doubled_quotes() {
        assert_eq!(
            split_row(r#""say ""hi"", then go",https://youtu.be/aaaaaaaaaaa"#),
            vec![r#"say "hi", then go"#, "https://youtu.be/aaaaaaaaaaa"]
        );
        assert_eq!(split_row(r#""""""#), vec![r#"""#]);
        assert_eq!(split_row(r#""",x"#), vec!["", "x"]);
    }

    #[test]
    fn test_parse_batch_csv_requires_url_header() {
        assert!(parse_batch_csv("link\nhttps://youtu.be/aaaaaaaaaaa").is_err());
        assert!(parse_batch_csv("").is_err());
    }

    #[test]
    fn test_read_batch_urls_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        fs_err::write(&path, "url\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n").unwrap();

        let urls = read_batch_urls(&path).unwrap();
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ"]);
    }
}
