//! Reading targets from disk

use anyhow::{Context, Result};
use std::path::Path;

use crate::scrape_types::SourceRow;

/// URLs from a plain list, one per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    Ok(parse_url_list(&content))
}

/// Rows of a CSV with a header line, keeping column order
///
/// Short rows are padded with empty values so every row has every column.
pub fn parse_csv_rows(content: &str) -> Result<Vec<SourceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to parse CSV record")?;
        let row: SourceRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), record.get(idx).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

pub fn read_csv_rows(path: &Path) -> Result<Vec<SourceRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV {}", path.display()))?;
    parse_csv_rows(&content)
}
