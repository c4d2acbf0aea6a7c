use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or bound as statement
/// parameters.
///
/// The same enum is used across backends so the statement builder and the
/// typed operations never branch on driver types:
/// ```rust
/// use sql_conduit::types::SqlValue;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Calendar date value
    Date(NaiveDate),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SqlValue::Date(value) => Some(*value),
            SqlValue::Timestamp(value) => Some(value.date()),
            SqlValue::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            SqlValue::Timestamp(value) => Some(*value),
            SqlValue::Text(s) => {
                // Try "YYYY-MM-DD HH:MM:SS", then with fractional seconds.
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// The database backends supported by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// PostgreSQL database
    Postgres,
    /// SQLite database
    Sqlite,
}

/// The closed set of logical column types the layer understands.
///
/// Each variant owns a per-dialect SQL keyword, a reserved-name set used by
/// the column-name guard, and a decode rule (see [`crate::codec`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Text,
    Int,
    Boolean,
    Float,
    Real,
    Date,
    DateTime,
    Blob,
    /// Binary image payload; accepted and returned as a string on the typed
    /// surface but stored in a blob column.
    Image,
    Json,
}

impl LogicalType {
    pub const ALL: [LogicalType; 10] = [
        LogicalType::Text,
        LogicalType::Int,
        LogicalType::Boolean,
        LogicalType::Float,
        LogicalType::Real,
        LogicalType::Date,
        LogicalType::DateTime,
        LogicalType::Blob,
        LogicalType::Image,
        LogicalType::Json,
    ];

    /// Column names that would collide with this type's declaration keyword
    /// and produce an ambiguous `ALTER TABLE .. ADD text TEXT` statement.
    #[must_use]
    pub fn reserved_names(self) -> &'static [&'static str] {
        match self {
            LogicalType::Text => &["text"],
            LogicalType::Int => &["int", "in", "integer"],
            LogicalType::Boolean => &["boolean", "bool"],
            LogicalType::Float => &["float"],
            LogicalType::Real => &["real"],
            LogicalType::Date => &["date"],
            LogicalType::DateTime => &["datetime", "timestamp"],
            // Image columns are declared as blobs, so `blob` is the name that
            // collides with the declaration.
            LogicalType::Blob | LogicalType::Image => &["blob"],
            LogicalType::Json => &["json"],
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogicalType::Text => "Text",
            LogicalType::Int => "Int",
            LogicalType::Boolean => "Boolean",
            LogicalType::Float => "Float",
            LogicalType::Real => "Real",
            LogicalType::Date => "Date",
            LogicalType::DateTime => "DateTime",
            LogicalType::Blob => "Blob",
            LogicalType::Image => "Image",
            LogicalType::Json => "Json",
        };
        f.write_str(name)
    }
}
