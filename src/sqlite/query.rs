use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use crate::error::SqlConduitError;
use crate::results::ResultSet;
use crate::types::SqlValue;

use super::execution_failure;

/// Read one cell out of a SQLite row as a unified value.
fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlConduitError> {
    let value: Value = row.get(idx).map_err(execution_failure)?;
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    })
}

/// Run a prepared SELECT and materialize every row.
pub(crate) fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, SqlConduitError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(1);
    result_set.set_column_names(std::sync::Arc::new(column_names));

    let mut rows = stmt.query(&param_refs[..]).map_err(execution_failure)?;
    while let Some(row) = rows.next().map_err(execution_failure)? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(row, idx)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
