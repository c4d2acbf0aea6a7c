//! Statement execution: build, acquire, dispatch, release. Every operation
//! opens a fresh connection and releases it before returning, on success and
//! failure alike.

use crate::codec;
use crate::connection::{ConnectionProvider, PerCallConnection};
use crate::error::SqlConduitError;
use crate::statement::{BuiltStatement, StatementRequest};
use crate::types::{LogicalType, SqlValue};

/// What a single-cell select found.
///
/// A missing row and a stored SQL NULL are different answers; callers that
/// do not care collapse both with [`SelectOutcome::into_option`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// No row matched the condition.
    NoRow,
    /// A row matched but the cell holds SQL NULL.
    Null,
    /// A row matched with a non-NULL, type-normalized value.
    Value(SqlValue),
}

impl SelectOutcome {
    /// Collapse the no-row / NULL distinction.
    #[must_use]
    pub fn into_option(self) -> Option<SqlValue> {
        match self {
            SelectOutcome::Value(v) => Some(v),
            SelectOutcome::NoRow | SelectOutcome::Null => None,
        }
    }

    /// The value, or [`SqlConduitError::NoSuchRow`] when nothing matched or
    /// the cell was NULL.
    pub fn require(self) -> Result<SqlValue, SqlConduitError> {
        self.into_option().ok_or(SqlConduitError::NoSuchRow)
    }
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// DDL/DML: rows affected (zero for DDL).
    RowsAffected(usize),
    /// Single-cell select.
    Row(SelectOutcome),
}

impl ExecutionResult {
    pub(crate) fn rows_affected(self) -> Result<usize, SqlConduitError> {
        match self {
            ExecutionResult::RowsAffected(n) => Ok(n),
            ExecutionResult::Row(_) => Err(SqlConduitError::invalid(
                "statement unexpectedly produced a row result",
            )),
        }
    }

    pub(crate) fn row(self) -> Result<SelectOutcome, SqlConduitError> {
        match self {
            ExecutionResult::Row(outcome) => Ok(outcome),
            ExecutionResult::RowsAffected(_) => Err(SqlConduitError::invalid(
                "statement unexpectedly produced a rows-affected result",
            )),
        }
    }
}

/// Execute one request against a fresh connection from the provider.
///
/// The statement is built (and therefore fully validated) before any
/// connection is opened, so invalid input never costs a network round trip.
///
/// # Errors
/// Build, connection, execution, and decode failures, each under its own
/// [`SqlConduitError`] variant.
pub async fn run(
    provider: &dyn ConnectionProvider,
    request: &StatementRequest,
) -> Result<ExecutionResult, SqlConduitError> {
    run_in(provider, None, request).await
}

/// Like [`run`] but against a different database than the provider's default.
pub async fn run_in(
    provider: &dyn ConnectionProvider,
    database_override: Option<&str>,
    request: &StatementRequest,
) -> Result<ExecutionResult, SqlConduitError> {
    let built = request.build(provider.dialect())?;
    tracing::debug!(sql = %built.sql, params = built.params.len(), "executing statement");

    let conn = provider.acquire(database_override).await?;
    let result = dispatch(&conn, request, &built).await;
    conn.close().await;

    match &result {
        Ok(outcome) => tracing::debug!(?outcome, "statement complete"),
        Err(e) => tracing::warn!(error = %e, sql = %built.sql, "statement failed"),
    }
    result
}

async fn dispatch(
    conn: &PerCallConnection,
    request: &StatementRequest,
    built: &BuiltStatement,
) -> Result<ExecutionResult, SqlConduitError> {
    if let StatementRequest::Select { ty, .. } = request {
        let result_set = match conn {
            #[cfg(feature = "postgres")]
            PerCallConnection::Postgres(pg) => {
                crate::postgres::execute_select(pg, &built.sql, &built.params).await?
            }
            #[cfg(feature = "sqlite")]
            PerCallConnection::Sqlite(sq) => {
                crate::sqlite::execute_select(sq, &built.sql, &built.params).await?
            }
        };
        Ok(ExecutionResult::Row(first_cell(&result_set, *ty)?))
    } else {
        let affected = match conn {
            #[cfg(feature = "postgres")]
            PerCallConnection::Postgres(pg) => {
                crate::postgres::execute_dml(pg, &built.sql, &built.params).await?
            }
            #[cfg(feature = "sqlite")]
            PerCallConnection::Sqlite(sq) => {
                crate::sqlite::execute_dml(sq, &built.sql, &built.params).await?
            }
        };
        Ok(ExecutionResult::RowsAffected(affected))
    }
}

/// Extract and type-normalize the first cell of the first row.
fn first_cell(
    result_set: &crate::results::ResultSet,
    ty: LogicalType,
) -> Result<SelectOutcome, SqlConduitError> {
    let Some(row) = result_set.first_row() else {
        return Ok(SelectOutcome::NoRow);
    };
    let raw = row
        .get_by_index(0)
        .cloned()
        .ok_or_else(|| SqlConduitError::invalid("select returned a row with no columns"))?;
    let decoded = codec::decode(ty, raw)?;
    if decoded.is_null() {
        Ok(SelectOutcome::Null)
    } else {
        Ok(SelectOutcome::Value(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ResultSet;
    use std::sync::Arc;

    #[test]
    fn outcome_collapses_to_option() {
        assert_eq!(SelectOutcome::NoRow.into_option(), None);
        assert_eq!(SelectOutcome::Null.into_option(), None);
        assert_eq!(
            SelectOutcome::Value(SqlValue::Int(7)).into_option(),
            Some(SqlValue::Int(7))
        );
    }

    #[test]
    fn require_surfaces_no_such_row() {
        assert!(matches!(
            SelectOutcome::NoRow.require(),
            Err(SqlConduitError::NoSuchRow)
        ));
        assert!(matches!(
            SelectOutcome::Null.require(),
            Err(SqlConduitError::NoSuchRow)
        ));
    }

    #[test]
    fn first_cell_distinguishes_no_row_from_null() {
        let empty = ResultSet::with_capacity(0);
        assert_eq!(
            first_cell(&empty, LogicalType::Text).unwrap(),
            SelectOutcome::NoRow
        );

        let mut with_null = ResultSet::with_capacity(1);
        with_null.set_column_names(Arc::new(vec!["name".into()]));
        with_null.add_row_values(vec![SqlValue::Null]);
        assert_eq!(
            first_cell(&with_null, LogicalType::Text).unwrap(),
            SelectOutcome::Null
        );
    }

    #[test]
    fn first_cell_normalizes_sqlite_booleans() {
        let mut rs = ResultSet::with_capacity(1);
        rs.set_column_names(Arc::new(vec!["flag".into()]));
        rs.add_row_values(vec![SqlValue::Int(1)]);
        assert_eq!(
            first_cell(&rs, LogicalType::Boolean).unwrap(),
            SelectOutcome::Value(SqlValue::Bool(true))
        );
    }
}
