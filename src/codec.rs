//! Per-logical-type value encoding and decoding.
//!
//! Bound parameters are the primary encode path (see the backend `params`
//! modules); [`encode_literal`] exists only for callers that need an inline
//! statement and applies quote doubling plus NUL rejection instead of the
//! unescaped literal embedding this layer replaces.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SqlConduitError;
use crate::types::{LogicalType, SqlValue};

/// Guard against column names that case-insensitively collide with the SQL
/// keyword their type declares, which would produce ambiguous statement text.
pub fn check_column_name(ty: LogicalType, column: &str) -> Result<(), SqlConduitError> {
    for reserved in ty.reserved_names() {
        if column.eq_ignore_ascii_case(reserved) {
            return Err(SqlConduitError::invalid(format!(
                "column name `{column}` collides with the {ty} type keyword"
            )));
        }
    }
    Ok(())
}

/// Render a value as an inline SQL literal.
///
/// Embedded single quotes are doubled; NUL bytes are rejected because no
/// backend accepts them inside a literal. Booleans render unquoted, blobs as
/// `X'..'` hex literals.
///
/// # Errors
/// Returns `SqlConduitError::InvalidArgument` for values that cannot be made
/// safe as a literal.
pub fn encode_literal(value: &SqlValue) -> Result<String, SqlConduitError> {
    match value {
        SqlValue::Null => Ok("NULL".to_string()),
        SqlValue::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        SqlValue::Int(i) => Ok(i.to_string()),
        SqlValue::Float(f) => Ok(f.to_string()),
        SqlValue::Text(s) => quoted(s),
        SqlValue::Date(d) => quoted(&d.format("%Y-%m-%d").to_string()),
        SqlValue::Timestamp(dt) => quoted(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        SqlValue::Json(j) => quoted(&j.to_string()),
        SqlValue::Blob(bytes) => {
            let mut literal = String::with_capacity(bytes.len() * 2 + 3);
            literal.push_str("X'");
            for byte in bytes {
                literal.push_str(&format!("{byte:02X}"));
            }
            literal.push('\'');
            Ok(literal)
        }
    }
}

fn quoted(raw: &str) -> Result<String, SqlConduitError> {
    if raw.contains('\0') {
        return Err(SqlConduitError::invalid(
            "string value contains an embedded NUL byte",
        ));
    }
    Ok(format!("'{}'", raw.replace('\'', "''")))
}

/// Normalize a raw result cell to the canonical value shape of a logical
/// type. SQL NULL stays NULL; everything else either coerces the way the
/// backends store it (booleans as 0/1 integers, dates as text on SQLite) or
/// fails with a decode error.
pub fn decode(ty: LogicalType, raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    match ty {
        LogicalType::Text => decode_text(raw),
        LogicalType::Int => decode_int(raw),
        LogicalType::Boolean => decode_bool(raw),
        LogicalType::Float | LogicalType::Real => decode_float(ty, raw),
        LogicalType::Date => decode_date(raw),
        LogicalType::DateTime => decode_datetime(raw),
        LogicalType::Blob => match raw {
            SqlValue::Blob(b) => Ok(SqlValue::Blob(b)),
            SqlValue::Text(s) => Ok(SqlValue::Blob(s.into_bytes())),
            other => mismatch(ty, &other),
        },
        LogicalType::Image => match raw {
            // Image payloads live in blob columns but surface as strings.
            SqlValue::Blob(b) => match String::from_utf8(b) {
                Ok(s) => Ok(SqlValue::Text(s)),
                Err(_) => Err(SqlConduitError::Decode(
                    "image cell is not valid UTF-8".into(),
                )),
            },
            SqlValue::Text(s) => Ok(SqlValue::Text(s)),
            other => mismatch(ty, &other),
        },
        LogicalType::Json => match raw {
            SqlValue::Json(j) => Ok(SqlValue::Json(j)),
            SqlValue::Text(s) => serde_json::from_str(&s)
                .map(SqlValue::Json)
                .map_err(|e| SqlConduitError::Decode(format!("json cell did not parse: {e}"))),
            other => mismatch(ty, &other),
        },
    }
}

fn decode_text(raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    // String reads coerce scalars the way JDBC's getString does.
    match raw {
        SqlValue::Text(s) => Ok(SqlValue::Text(s)),
        SqlValue::Int(i) => Ok(SqlValue::Text(i.to_string())),
        SqlValue::Float(f) => Ok(SqlValue::Text(f.to_string())),
        SqlValue::Bool(b) => Ok(SqlValue::Text(b.to_string())),
        other => mismatch(LogicalType::Text, &other),
    }
}

fn decode_int(raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    match raw {
        SqlValue::Int(i) => Ok(SqlValue::Int(i)),
        SqlValue::Float(f) => Ok(SqlValue::Int(f as i64)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|e| SqlConduitError::Decode(format!("integer cell did not parse: {e}"))),
        other => mismatch(LogicalType::Int, &other),
    }
}

fn decode_bool(raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    match raw {
        SqlValue::Bool(b) => Ok(SqlValue::Bool(b)),
        SqlValue::Int(i) => Ok(SqlValue::Bool(i != 0)),
        SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(SqlValue::Bool(true)),
            "false" | "0" => Ok(SqlValue::Bool(false)),
            other => Err(SqlConduitError::Decode(format!(
                "boolean cell did not parse: `{other}`"
            ))),
        },
        other => mismatch(LogicalType::Boolean, &other),
    }
}

fn decode_float(ty: LogicalType, raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    match raw {
        SqlValue::Float(f) => Ok(SqlValue::Float(f)),
        SqlValue::Int(i) => Ok(SqlValue::Float(i as f64)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(SqlValue::Float)
            .map_err(|e| SqlConduitError::Decode(format!("float cell did not parse: {e}"))),
        other => mismatch(ty, &other),
    }
}

fn decode_date(raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    match raw {
        SqlValue::Date(d) => Ok(SqlValue::Date(d)),
        SqlValue::Timestamp(dt) => Ok(SqlValue::Date(dt.date())),
        SqlValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|e| SqlConduitError::Decode(format!("date cell did not parse: {e}"))),
        other => mismatch(LogicalType::Date, &other),
    }
}

fn decode_datetime(raw: SqlValue) -> Result<SqlValue, SqlConduitError> {
    match raw {
        SqlValue::Timestamp(dt) => Ok(SqlValue::Timestamp(dt)),
        SqlValue::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(SqlValue::Timestamp)
            .ok_or_else(|| SqlConduitError::Decode("date cell out of range".into())),
        SqlValue::Text(s) => {
            let trimmed = s.trim();
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
                .map(SqlValue::Timestamp)
                .map_err(|e| SqlConduitError::Decode(format!("datetime cell did not parse: {e}")))
        }
        other => mismatch(LogicalType::DateTime, &other),
    }
}

fn mismatch(ty: LogicalType, raw: &SqlValue) -> Result<SqlValue, SqlConduitError> {
    Err(SqlConduitError::Decode(format!(
        "cannot read {raw:?} as {ty}"
    )))
}
