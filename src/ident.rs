//! Identifier validation for table and column names.
//!
//! Condition clauses are deliberately excluded: they are caller-supplied
//! predicate text passed through verbatim.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlConduitError;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Reject empty or unparseable identifiers before any statement text is built.
pub fn validate_identifier(kind: &str, name: &str) -> Result<(), SqlConduitError> {
    if name.is_empty() {
        return Err(SqlConduitError::invalid(format!("{kind} is empty")));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(SqlConduitError::invalid(format!(
            "{kind} `{name}` is not a valid SQL identifier"
        )));
    }
    Ok(())
}

/// Reject empty required values (connection fields, conditions, overrides).
pub fn require_non_empty(kind: &str, value: &str) -> Result<(), SqlConduitError> {
    if value.is_empty() {
        Err(SqlConduitError::invalid(format!("{kind} is empty")))
    } else {
        Ok(())
    }
}
