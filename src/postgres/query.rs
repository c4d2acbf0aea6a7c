//! Row extraction for the Postgres backend.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row as PgRow;

use crate::error::{BackendFailure, SqlConduitError};
use crate::results::ResultSet;
use crate::types::SqlValue;

fn extract_failure(e: tokio_postgres::Error) -> SqlConduitError {
    SqlConduitError::Execution(BackendFailure::from_message(format!(
        "postgres value extraction error: {e}"
    )))
}

/// Convert one cell to a [`SqlValue`] based on the column's declared type.
pub(crate) fn extract_value(row: &PgRow, idx: usize) -> Result<SqlValue, SqlConduitError> {
    let type_name = row.columns()[idx].type_().name();
    let value = match type_name {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(extract_failure)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(extract_failure)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Int),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(extract_failure)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "float8" | "numeric" => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Float),
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Bool),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Date),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Timestamp),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(extract_failure)?
            .map(|v| SqlValue::Timestamp(v.naive_utc())),
        "json" | "jsonb" => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Json),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Blob),
        _ => row
            .try_get::<_, Option<String>>(idx)
            .map_err(extract_failure)?
            .map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

/// Materialize a full [`ResultSet`] from the rows `tokio-postgres` returned.
pub(crate) fn result_set_from_rows(rows: &[PgRow]) -> Result<ResultSet, SqlConduitError> {
    let mut result = ResultSet::with_capacity(rows.len());
    if let Some(first) = rows.first() {
        let names: Vec<String> = first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        result.set_column_names(Arc::new(names));
    }
    for row in rows {
        let mut values = Vec::with_capacity(row.columns().len());
        for idx in 0..row.columns().len() {
            values.push(extract_value(row, idx)?);
        }
        result.add_row_values(values);
    }
    Ok(result)
}
