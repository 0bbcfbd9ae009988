//! Read the relation type ids observed in the operational store
//!
//! Either a CSV export with a header row (the `type_id` column is used when
//! present, otherwise the first column) or a plain list with one id per line.

use anyhow::{Context, Result};
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::{parse_id, sniff_delimiter};

const ID_COLUMN: &str = "type_id";

/// Read observed ids in order of first appearance, without duplicates
pub fn read_observed_ids<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read observed ids: {}", path.display()))?;
    parse_observed(&content)
        .with_context(|| format!("Failed to parse observed ids: {}", path.display()))
}

fn parse_observed(content: &str) -> Result<Vec<i64>> {
    let content = content.trim_start_matches('\u{feff}');
    let Some(first) = content.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let delimiter = sniff_delimiter(first);
    let has_header = first
        .split(delimiter as char)
        .next()
        .and_then(parse_id)
        .is_none();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_header)
        .flexible(true)
        .from_reader(content.as_bytes());

    let column = if has_header {
        reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(ID_COLUMN))
            .unwrap_or(0)
    } else {
        0
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.context("Failed to read CSV row")?;
        let cell = record.get(column).unwrap_or_default().trim();
        if cell.is_empty() {
            continue;
        }
        match parse_id(cell) {
            Some(id) => {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
            None => warn!("Skipping observed entry {}: '{}' is not an id", index + 1, cell),
        }
    }

    Ok(ids)
}
