//! Maintenance statement for retired relation types
//!
//! The statement is rendered for an operator to review and run by hand.
//! Nothing in this crate executes it.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),
    #[error("identifier pattern failed to compile")]
    Pattern(#[from] regex::Error),
}

/// Table and column names: plain identifiers, optionally schema-qualified
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$";

/// Render `BEGIN; DELETE FROM <table> WHERE <column> IN (<ids>);`
///
/// Returns `None` when there is nothing to delete. The transaction is left
/// open so the operator decides between COMMIT and ROLLBACK.
pub fn render_delete_statement(
    table: &str,
    column: &str,
    ids: &[i64],
) -> Result<Option<String>, StatementError> {
    let identifier = Regex::new(IDENTIFIER_PATTERN)?;
    for name in [table, column] {
        if !identifier.is_match(name) {
            return Err(StatementError::InvalidIdentifier(name.to_string()));
        }
    }

    if ids.is_empty() {
        return Ok(None);
    }

    let literals = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Some(format!(
        "BEGIN; DELETE FROM {} WHERE {} IN ({});",
        table, column, literals
    )))
}
