//! Readers for the operator-supplied lists used by reconciliation

pub mod obsolete;
pub mod observed;

pub use obsolete::read_obsolete_table;
pub use observed::read_observed_ids;

use std::path::Path;

/// Pick `;` for exports from spreadsheet tools set to a comma decimal locale
pub(crate) fn sniff_delimiter(first_line: &str) -> u8 {
    if first_line.contains(';') && !first_line.contains(',') {
        b';'
    } else {
        b','
    }
}

pub(crate) fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("txt"))
}

/// Parse an identifier cell, accepting whole floats such as `608.0`
pub(crate) fn parse_id(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(id) = cell.parse::<i64>() {
        return Some(id);
    }
    let float = cell.parse::<f64>().ok()?;
    (float.fract() == 0.0 && float.abs() < i64::MAX as f64).then_some(float as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 608 "), Some(608));
        assert_eq!(parse_id("608.0"), Some(608));
        assert_eq!(parse_id("608.5"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("VT_Id;VT_navn;TS_Id"), b';');
        assert_eq!(sniff_delimiter("VT_Id,VT_navn,TS_Id"), b',');
        assert_eq!(sniff_delimiter("type_id"), b',');
    }
}
