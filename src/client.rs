//! High-level client surface: a [`SqlClient`] wraps a provider and exposes
//! generic operations plus a per-logical-type typed surface. Every call opens
//! and releases its own connection through the executor.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::connection::{ConnectionProvider, ConnectionTarget};
use crate::error::SqlConduitError;
use crate::executor::{self, SelectOutcome};
use crate::statement::{ColumnSpec, StatementRequest};
use crate::types::{LogicalType, SqlValue};

/// Client-side entry point for the whole operation surface.
///
/// Generic operations take an explicit table name; the typed surface works
/// against the configured default table and fails with
/// [`SqlConduitError::MissingTable`] when none is set.
#[derive(Clone)]
pub struct SqlClient {
    provider: Arc<dyn ConnectionProvider>,
    default_table: Option<String>,
}

impl SqlClient {
    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn postgres(target: ConnectionTarget) -> Self {
        Self::with_provider(Arc::new(crate::postgres::PostgresProvider::new(target)))
    }

    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite(target: ConnectionTarget) -> Self {
        Self::with_provider(Arc::new(crate::sqlite::SqliteProvider::new(target)))
    }

    #[must_use]
    pub fn with_provider(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            default_table: None,
        }
    }

    /// Set the table the typed surface operates on.
    #[must_use]
    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.default_table = Some(table.into());
        self
    }

    fn default_table(&self) -> Result<&str, SqlConduitError> {
        self.default_table
            .as_deref()
            .ok_or(SqlConduitError::MissingTable)
    }

    /// Create a table holding only the auto-increment `id` primary key.
    /// Columns are added afterwards, one [`SqlClient::add_column`] per column.
    ///
    /// # Errors
    /// Build, connection, and execution failures.
    pub async fn create_table(&self, table: &str) -> Result<(), SqlConduitError> {
        let request = StatementRequest::CreateTable {
            table: table.to_owned(),
        };
        executor::run(self.provider.as_ref(), &request)
            .await?
            .rows_affected()?;
        Ok(())
    }

    /// Add a column of the given logical type to an existing table.
    pub async fn add_column(
        &self,
        table: &str,
        column: &str,
        ty: LogicalType,
    ) -> Result<(), SqlConduitError> {
        let request = StatementRequest::AddColumn {
            table: table.to_owned(),
            column: ColumnSpec::new(column, ty),
        };
        executor::run(self.provider.as_ref(), &request)
            .await?
            .rows_affected()?;
        Ok(())
    }

    /// Insert one new row. Always creates a row, never upserts; NULL inputs
    /// are rejected because an absent column already yields NULL.
    pub async fn insert(
        &self,
        table: &str,
        columns: Vec<(ColumnSpec, SqlValue)>,
    ) -> Result<(), SqlConduitError> {
        reject_null_inputs(&columns)?;
        let request = StatementRequest::Insert {
            table: table.to_owned(),
            columns,
        };
        executor::run(self.provider.as_ref(), &request)
            .await?
            .rows_affected()?;
        Ok(())
    }

    /// Update every row matching the condition; returns the number of rows
    /// changed. Zero matches is a successful outcome, not an error.
    pub async fn update(
        &self,
        table: &str,
        columns: Vec<(ColumnSpec, SqlValue)>,
        condition: &str,
    ) -> Result<usize, SqlConduitError> {
        reject_null_inputs(&columns)?;
        let request = StatementRequest::Update {
            table: table.to_owned(),
            columns,
            condition: condition.to_owned(),
        };
        executor::run(self.provider.as_ref(), &request)
            .await?
            .rows_affected()
    }

    /// Select one cell from the first row matching the condition,
    /// distinguishing "no row" from a stored NULL.
    pub async fn select(
        &self,
        table: &str,
        column: &str,
        ty: LogicalType,
        condition: &str,
    ) -> Result<SelectOutcome, SqlConduitError> {
        let request = StatementRequest::Select {
            table: table.to_owned(),
            column: column.to_owned(),
            ty,
            condition: condition.to_owned(),
        };
        executor::run(self.provider.as_ref(), &request)
            .await?
            .row()
    }

    /// Like [`SqlClient::select`] but failing with
    /// [`SqlConduitError::NoSuchRow`] when nothing matched or the cell is NULL.
    pub async fn select_required(
        &self,
        table: &str,
        column: &str,
        ty: LogicalType,
        condition: &str,
    ) -> Result<SqlValue, SqlConduitError> {
        self.select(table, column, ty, condition).await?.require()
    }

    /// Typed column creation against the default table.
    pub async fn add_typed_column<T: ColumnType>(
        &self,
        column: &str,
    ) -> Result<(), SqlConduitError> {
        let table = self.default_table()?.to_owned();
        self.add_column(&table, column, T::LOGICAL).await
    }

    /// Typed single-column insert against the default table.
    pub async fn insert_value<T: ColumnType>(
        &self,
        column: &str,
        value: T::Value,
    ) -> Result<(), SqlConduitError> {
        let table = self.default_table()?.to_owned();
        self.insert(
            &table,
            vec![(ColumnSpec::new(column, T::LOGICAL), T::into_value(value))],
        )
        .await
    }

    /// Typed single-column update against the default table.
    pub async fn update_value<T: ColumnType>(
        &self,
        column: &str,
        value: T::Value,
        condition: &str,
    ) -> Result<usize, SqlConduitError> {
        let table = self.default_table()?.to_owned();
        self.update(
            &table,
            vec![(ColumnSpec::new(column, T::LOGICAL), T::into_value(value))],
            condition,
        )
        .await
    }

    /// Typed single-cell select against the default table. Collapses the
    /// no-row / NULL distinction; use [`SqlClient::select`] to keep it.
    pub async fn select_value<T: ColumnType>(
        &self,
        column: &str,
        condition: &str,
    ) -> Result<Option<T::Value>, SqlConduitError> {
        let table = self.default_table()?.to_owned();
        match self.select(&table, column, T::LOGICAL, condition).await? {
            SelectOutcome::Value(v) => Ok(Some(T::from_value(v)?)),
            SelectOutcome::NoRow | SelectOutcome::Null => Ok(None),
        }
    }
}

impl std::fmt::Debug for SqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlClient")
            .field("default_table", &self.default_table)
            .finish_non_exhaustive()
    }
}

fn reject_null_inputs(columns: &[(ColumnSpec, SqlValue)]) -> Result<(), SqlConduitError> {
    for (spec, value) in columns {
        if value.is_null() {
            return Err(SqlConduitError::invalid(format!(
                "column `{}` was given an explicit NULL; omit the column instead",
                spec.name
            )));
        }
    }
    Ok(())
}

/// Maps a logical column type to its Rust-side value representation.
pub trait ColumnType {
    const LOGICAL: LogicalType;
    type Value;

    fn into_value(value: Self::Value) -> SqlValue;

    /// Convert a type-normalized, non-NULL cell back to the Rust value.
    ///
    /// # Errors
    /// Returns `SqlConduitError::Decode` when the cell does not carry this
    /// type's shape.
    fn from_value(value: SqlValue) -> Result<Self::Value, SqlConduitError>;
}

fn shape_mismatch(expected: &str, got: &SqlValue) -> SqlConduitError {
    SqlConduitError::Decode(format!("expected a {expected} cell, got {got:?}"))
}

/// Marker types for the typed surface, one per [`LogicalType`].
pub mod column {
    use super::{ColumnType, JsonValue, LogicalType, NaiveDate, NaiveDateTime, SqlConduitError,
        SqlValue, shape_mismatch};

    macro_rules! column_marker {
        ($(#[$doc:meta])* $marker:ident, $logical:ident, $value:ty,
         into: |$iv:ident| $into:expr, from: $expected:literal, |$fv:ident| $from:pat => $out:expr) => {
            $(#[$doc])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl ColumnType for $marker {
                const LOGICAL: LogicalType = LogicalType::$logical;
                type Value = $value;

                fn into_value($iv: Self::Value) -> SqlValue {
                    $into
                }

                fn from_value($fv: SqlValue) -> Result<Self::Value, SqlConduitError> {
                    match $fv {
                        $from => Ok($out),
                        other => Err(shape_mismatch($expected, &other)),
                    }
                }
            }
        };
    }

    column_marker!(Text, Text, String,
        into: |v| SqlValue::Text(v), from: "text", |raw| SqlValue::Text(s) => s);
    column_marker!(Int, Int, i64,
        into: |v| SqlValue::Int(v), from: "integer", |raw| SqlValue::Int(i) => i);
    column_marker!(Boolean, Boolean, bool,
        into: |v| SqlValue::Bool(v), from: "boolean", |raw| SqlValue::Bool(b) => b);
    column_marker!(
        /// Single-precision float; widened for transport, narrowed on read.
        Float, Float, f32,
        into: |v| SqlValue::Float(f64::from(v)), from: "float", |raw| SqlValue::Float(f) => f as f32);
    column_marker!(Real, Real, f64,
        into: |v| SqlValue::Float(v), from: "float", |raw| SqlValue::Float(f) => f);
    column_marker!(Date, Date, NaiveDate,
        into: |v| SqlValue::Date(v), from: "date", |raw| SqlValue::Date(d) => d);
    column_marker!(DateTime, DateTime, NaiveDateTime,
        into: |v| SqlValue::Timestamp(v), from: "timestamp", |raw| SqlValue::Timestamp(t) => t);
    column_marker!(Blob, Blob, Vec<u8>,
        into: |v| SqlValue::Blob(v), from: "blob", |raw| SqlValue::Blob(b) => b);
    column_marker!(
        /// Stored in a binary column, surfaced as UTF-8 text.
        Image, Image, String,
        into: |v| SqlValue::Blob(v.into_bytes()), from: "text", |raw| SqlValue::Text(s) => s);
    column_marker!(Json, Json, JsonValue,
        into: |v| SqlValue::Json(v), from: "json", |raw| SqlValue::Json(j) => j);
}

/// Expands the per-type convenience methods of the typed surface.
macro_rules! typed_surface {
    ($(($marker:ident, $create:ident, $insert:ident, $update:ident, $select:ident)),+ $(,)?) => {
        impl SqlClient {
            $(
                #[doc = concat!("Add a ", stringify!($marker), " column to the default table.")]
                pub async fn $create(&self, column: &str) -> Result<(), SqlConduitError> {
                    self.add_typed_column::<column::$marker>(column).await
                }

                #[doc = concat!("Insert a new row with a ", stringify!($marker), " value in the default table.")]
                pub async fn $insert(
                    &self,
                    column: &str,
                    value: impl Into<<column::$marker as ColumnType>::Value>,
                ) -> Result<(), SqlConduitError> {
                    self.insert_value::<column::$marker>(column, value.into()).await
                }

                #[doc = concat!("Set a ", stringify!($marker), " column on every matching row of the default table.")]
                pub async fn $update(
                    &self,
                    column: &str,
                    value: impl Into<<column::$marker as ColumnType>::Value>,
                    condition: &str,
                ) -> Result<usize, SqlConduitError> {
                    self.update_value::<column::$marker>(column, value.into(), condition)
                        .await
                }

                #[doc = concat!("Read a ", stringify!($marker), " cell from the first matching row of the default table.")]
                pub async fn $select(
                    &self,
                    column: &str,
                    condition: &str,
                ) -> Result<Option<<column::$marker as ColumnType>::Value>, SqlConduitError> {
                    self.select_value::<column::$marker>(column, condition).await
                }
            )+
        }
    };
}

typed_surface!(
    (Text, create_text_column, insert_text, update_text, select_text),
    (Int, create_int_column, insert_int, update_int, select_int),
    (Boolean, create_boolean_column, insert_boolean, update_boolean, select_boolean),
    (Float, create_float_column, insert_float, update_float, select_float),
    (Real, create_real_column, insert_real, update_real, select_real),
    (Date, create_date_column, insert_date, update_date, select_date),
    (DateTime, create_datetime_column, insert_datetime, update_datetime, select_datetime),
    (Blob, create_blob_column, insert_blob, update_blob, select_blob),
    (Image, create_image_column, insert_image, update_image, select_image),
    (Json, create_json_column, insert_json, update_json, select_json),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_round_trip_values() {
        assert_eq!(
            column::Text::into_value("hi".to_string()),
            SqlValue::Text("hi".into())
        );
        assert_eq!(
            column::Text::from_value(SqlValue::Text("hi".into())).unwrap(),
            "hi"
        );
        assert_eq!(column::Int::into_value(42), SqlValue::Int(42));
        assert_eq!(column::Boolean::into_value(true), SqlValue::Bool(true));
        assert_eq!(column::Float::into_value(1.5), SqlValue::Float(1.5));
        assert_eq!(
            column::Image::into_value("png".to_string()),
            SqlValue::Blob(b"png".to_vec())
        );
    }

    #[test]
    fn marker_from_value_rejects_wrong_shape() {
        assert!(matches!(
            column::Int::from_value(SqlValue::Text("7".into())),
            Err(SqlConduitError::Decode(_))
        ));
    }

    #[test]
    fn null_inputs_are_rejected() {
        let columns = vec![(
            ColumnSpec::new("name", LogicalType::Text),
            SqlValue::Null,
        )];
        assert!(matches!(
            reject_null_inputs(&columns),
            Err(SqlConduitError::InvalidArgument(_))
        ));
    }
}
