//! Read the "known obsolete" relation table
//!
//! The table comes as a spreadsheet (xlsx, xls, ods) or a CSV export of one.
//! The parent and child object types share the column names `VT_Id` and
//! `VT_navn`; the second occurrence is the child. Exports that deduplicate
//! header names call the second pair `VT_Id.1` and `VT_navn.1`.

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use super::{is_csv, parse_id, sniff_delimiter};
use crate::services::reconcile::ObsoleteRow;

/// Rows read from the obsolete table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObsoleteTable {
    pub rows: Vec<ObsoleteRow>,
    /// Data rows dropped for lacking a usable `TS_Id`
    pub skipped: usize,
}

/// Read the obsolete table from `path`
///
/// `sheet` only applies to spreadsheets.
pub fn read_obsolete_table<P: AsRef<Path>>(path: P, sheet: &str) -> Result<ObsoleteTable> {
    let path = path.as_ref();
    let (headers, rows) = if is_csv(path) {
        read_csv_cells(path)?
    } else {
        read_sheet_cells(path, sheet)?
    };

    parse_rows(&headers, &rows)
        .with_context(|| format!("Failed to read obsolete table: {}", path.display()))
}

fn read_sheet_cells(path: &Path, sheet: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        bail!(
            "Sheet '{}' not found in {} (available: {})",
            sheet,
            path.display(),
            workbook.sheet_names().join(", ")
        );
    }

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet: {}", sheet))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());

    let headers = rows.next().unwrap_or_default();
    Ok((headers, rows.collect()))
}

fn read_csv_cells(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    let delimiter = sniff_delimiter(content.lines().next().unwrap_or_default());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV row")?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

/// Column positions, resolved once from the header row
struct Columns {
    parent_id: Option<usize>,
    parent_name: Option<usize>,
    child_id: Option<usize>,
    child_name: Option<usize>,
    legacy_id: usize,
    version: Option<usize>,
    validity: Option<usize>,
    relation_name: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let (parent_id, child_id) = first_and_second(headers, "VT_Id");
        let (parent_name, child_name) = first_and_second(headers, "VT_navn");

        let Some(legacy_id) = find("TS_Id") else {
            bail!("Missing required column 'TS_Id' (found: {})", headers.join(", "));
        };

        Ok(Self {
            parent_id,
            parent_name,
            child_id,
            child_name,
            legacy_id,
            version: find("dakat_versjon"),
            validity: find("A og B gyldig"),
            relation_name: find("SHT_Navn"),
        })
    }
}

/// First column called `name`, and the second one or `<name>.1`
fn first_and_second(headers: &[String], name: &str) -> (Option<usize>, Option<usize>) {
    let renamed = format!("{}.1", name);
    let mut matches = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim() == name)
        .map(|(i, _)| i);

    let first = matches.next();
    let second = matches
        .next()
        .or_else(|| headers.iter().position(|h| h.trim() == renamed));
    (first, second)
}

fn parse_rows(headers: &[String], rows: &[Vec<String>]) -> Result<ObsoleteTable> {
    let columns = Columns::resolve(headers)?;
    let mut table = ObsoleteTable::default();

    let text = |row: &[String], col: Option<usize>| -> String {
        col.and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    for (index, row) in rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        // Header is line 1
        let line = index + 2;
        let raw_id = text(row, Some(columns.legacy_id));
        let Some(legacy_id) = parse_id(&raw_id) else {
            warn!("Skipping obsolete row {}: unusable TS_Id '{}'", line, raw_id);
            table.skipped += 1;
            continue;
        };

        table.rows.push(ObsoleteRow {
            parent_type_id: parse_id(&text(row, columns.parent_id)),
            parent_name: text(row, columns.parent_name),
            child_type_id: parse_id(&text(row, columns.child_id)),
            child_name: text(row, columns.child_name),
            legacy_id,
            catalog_version: text(row, columns.version),
            validity: text(row, columns.validity),
            relation_name: text(row, columns.relation_name),
        });
    }

    debug!(
        "Read {} obsolete rows ({} skipped)",
        table.rows.len(),
        table.skipped
    );
    Ok(table)
}
