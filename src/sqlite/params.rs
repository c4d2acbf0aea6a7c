use crate::types::SqlValue;

/// Convert unified values into rusqlite values for binding.
///
/// SQLite has no native boolean, date, or json storage classes, so those ride
/// as integers and text the same way the backend itself would store them.
pub(crate) fn to_sqlite_values(params: &[SqlValue]) -> Vec<rusqlite::types::Value> {
    params.iter().map(to_sqlite_value).collect()
}

fn to_sqlite_value(value: &SqlValue) -> rusqlite::types::Value {
    match value {
        SqlValue::Int(i) => rusqlite::types::Value::Integer(*i),
        SqlValue::Float(f) => rusqlite::types::Value::Real(*f),
        SqlValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
        SqlValue::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        SqlValue::Date(d) => rusqlite::types::Value::Text(d.format("%Y-%m-%d").to_string()),
        SqlValue::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        SqlValue::Json(j) => rusqlite::types::Value::Text(j.to_string()),
        SqlValue::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
        SqlValue::Null => rusqlite::types::Value::Null,
    }
}
