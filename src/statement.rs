//! Statement construction: a [`StatementRequest`] describes one operation in
//! memory and is rendered to dialect-specific text immediately before
//! execution. Values travel as bound parameters; [`StatementRequest::render_inline`]
//! is the literal-embedding compatibility path and routes everything through
//! the hardened literal encoder.

use crate::codec;
use crate::error::SqlConduitError;
use crate::ident;
use crate::types::{DatabaseType, LogicalType, SqlValue};

/// Placeholder and keyword dialect of the target backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl Dialect {
    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${n}"),
            Dialect::Sqlite => format!("?{n}"),
        }
    }
}

impl From<DatabaseType> for Dialect {
    fn from(db: DatabaseType) -> Self {
        match db {
            DatabaseType::Postgres => Dialect::Postgres,
            DatabaseType::Sqlite => Dialect::Sqlite,
        }
    }
}

impl LogicalType {
    /// The column declaration keyword for this type in the given dialect.
    #[must_use]
    pub fn sql_keyword(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (LogicalType::Text, _) => "TEXT",
            (LogicalType::Int, _) => "INTEGER",
            (LogicalType::Boolean, _) => "BOOLEAN",
            (LogicalType::Float, Dialect::Postgres) => "REAL",
            (LogicalType::Float, Dialect::Sqlite) => "FLOAT",
            (LogicalType::Real, Dialect::Postgres) => "DOUBLE PRECISION",
            (LogicalType::Real, Dialect::Sqlite) => "DOUBLE",
            (LogicalType::Date, _) => "DATE",
            (LogicalType::DateTime, Dialect::Postgres) => "TIMESTAMP",
            (LogicalType::DateTime, Dialect::Sqlite) => "DATETIME",
            (LogicalType::Blob | LogicalType::Image, Dialect::Postgres) => "BYTEA",
            (LogicalType::Blob | LogicalType::Image, Dialect::Sqlite) => "BLOB",
            (LogicalType::Json, Dialect::Postgres) => "JSON",
            (LogicalType::Json, Dialect::Sqlite) => "TEXT",
        }
    }
}

/// A column name paired with its logical type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: LogicalType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, ty: LogicalType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    fn validate(&self) -> Result<(), SqlConduitError> {
        ident::validate_identifier("column name", &self.name)?;
        codec::check_column_name(self.ty, &self.name)
    }
}

/// In-memory description of one SQL operation, built fresh per call.
#[derive(Debug, Clone)]
pub enum StatementRequest {
    /// Create a table with a single auto-increment integer primary key `id`.
    /// Further columns require separate [`StatementRequest::AddColumn`] calls.
    CreateTable { table: String },
    AddColumn {
        table: String,
        column: ColumnSpec,
    },
    /// Always creates a new row; never upserts.
    Insert {
        table: String,
        columns: Vec<(ColumnSpec, SqlValue)>,
    },
    /// Applies to every row matching the condition.
    Update {
        table: String,
        columns: Vec<(ColumnSpec, SqlValue)>,
        condition: String,
    },
    /// Restricted to the first matching row. The sentinel column name `all`
    /// (case-insensitive) selects `*`.
    Select {
        table: String,
        column: String,
        ty: LogicalType,
        condition: String,
    },
}

/// Rendered statement text plus the values to bind, in placeholder order.
#[derive(Debug, Clone)]
pub struct BuiltStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl StatementRequest {
    #[must_use]
    pub fn is_select(&self) -> bool {
        matches!(self, StatementRequest::Select { .. })
    }

    /// Render this request to parameterized statement text.
    ///
    /// All identifier validation and reserved-name checks happen here, before
    /// any connection is opened.
    ///
    /// # Errors
    /// Returns `SqlConduitError::InvalidArgument` for bad identifiers, empty
    /// conditions, keyword collisions, or an empty insert/update column list.
    pub fn build(&self, dialect: Dialect) -> Result<BuiltStatement, SqlConduitError> {
        match self {
            StatementRequest::CreateTable { table } => {
                ident::validate_identifier("table name", table)?;
                let sql = match dialect {
                    Dialect::Postgres => format!(
                        "CREATE TABLE {table} (id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY)"
                    ),
                    Dialect::Sqlite => {
                        format!("CREATE TABLE {table} (id INTEGER PRIMARY KEY AUTOINCREMENT)")
                    }
                };
                Ok(BuiltStatement {
                    sql,
                    params: Vec::new(),
                })
            }
            StatementRequest::AddColumn { table, column } => {
                ident::validate_identifier("table name", table)?;
                column.validate()?;
                let sql = format!(
                    "ALTER TABLE {table} ADD COLUMN {} {}",
                    column.name,
                    column.ty.sql_keyword(dialect)
                );
                Ok(BuiltStatement {
                    sql,
                    params: Vec::new(),
                })
            }
            StatementRequest::Insert { table, columns } => {
                ident::validate_identifier("table name", table)?;
                let (names, params) = collect_columns(columns)?;
                let placeholders = (1..=params.len())
                    .map(|n| dialect.placeholder(n))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "INSERT INTO {table} ({}) VALUES ({placeholders})",
                    names.join(", ")
                );
                Ok(BuiltStatement { sql, params })
            }
            StatementRequest::Update {
                table,
                columns,
                condition,
            } => {
                ident::validate_identifier("table name", table)?;
                ident::require_non_empty("where condition", condition)?;
                let (names, params) = collect_columns(columns)?;
                let assignments = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{name} = {}", dialect.placeholder(i + 1)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!("UPDATE {table} SET {assignments} WHERE {condition}");
                Ok(BuiltStatement { sql, params })
            }
            StatementRequest::Select {
                table,
                column,
                condition,
                ..
            } => {
                ident::validate_identifier("table name", table)?;
                ident::require_non_empty("where condition", condition)?;
                let projection = if column.eq_ignore_ascii_case("all") {
                    "*".to_string()
                } else {
                    ident::validate_identifier("column name", column)?;
                    column.clone()
                };
                let sql = format!("SELECT {projection} FROM {table} WHERE {condition} LIMIT 1");
                Ok(BuiltStatement {
                    sql,
                    params: Vec::new(),
                })
            }
        }
    }

    /// Render this request with inline literals instead of placeholders, for
    /// callers that cannot bind parameters. Values pass through
    /// [`codec::encode_literal`].
    ///
    /// The value fragments are assembled directly rather than substituted
    /// into parameterized text, so placeholder-shaped text inside a verbatim
    /// condition is never touched.
    ///
    /// # Errors
    /// Propagates build errors plus literal-encoding rejections.
    pub fn render_inline(&self, dialect: Dialect) -> Result<String, SqlConduitError> {
        match self {
            StatementRequest::Insert { table, columns } => {
                ident::validate_identifier("table name", table)?;
                let (names, params) = collect_columns(columns)?;
                let literals = params
                    .iter()
                    .map(codec::encode_literal)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!(
                    "INSERT INTO {table} ({}) VALUES ({})",
                    names.join(", "),
                    literals.join(", ")
                ))
            }
            StatementRequest::Update {
                table,
                columns,
                condition,
            } => {
                ident::validate_identifier("table name", table)?;
                ident::require_non_empty("where condition", condition)?;
                let (names, params) = collect_columns(columns)?;
                let assignments = names
                    .iter()
                    .zip(&params)
                    .map(|(name, value)| {
                        Ok(format!("{name} = {}", codec::encode_literal(value)?))
                    })
                    .collect::<Result<Vec<_>, SqlConduitError>>()?
                    .join(", ");
                Ok(format!("UPDATE {table} SET {assignments} WHERE {condition}"))
            }
            // The remaining kinds carry no bound values.
            other => Ok(other.build(dialect)?.sql),
        }
    }
}

fn collect_columns(
    columns: &[(ColumnSpec, SqlValue)],
) -> Result<(Vec<String>, Vec<SqlValue>), SqlConduitError> {
    if columns.is_empty() {
        return Err(SqlConduitError::invalid("no columns supplied"));
    }
    let mut names = Vec::with_capacity(columns.len());
    let mut params = Vec::with_capacity(columns.len());
    for (spec, value) in columns {
        spec.validate()?;
        names.push(spec.name.clone());
        params.push(value.clone());
    }
    Ok((names, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_req(value: SqlValue) -> StatementRequest {
        StatementRequest::Insert {
            table: "t".into(),
            columns: vec![(ColumnSpec::new("name", LogicalType::Text), value)],
        }
    }

    #[test]
    fn create_table_emits_identity_pk_per_dialect() {
        let req = StatementRequest::CreateTable { table: "t".into() };
        assert_eq!(
            req.build(Dialect::Sqlite).unwrap().sql,
            "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT)"
        );
        assert_eq!(
            req.build(Dialect::Postgres).unwrap().sql,
            "CREATE TABLE t (id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY)"
        );
    }

    #[test]
    fn add_column_uses_dialect_keyword() {
        let req = StatementRequest::AddColumn {
            table: "t".into(),
            column: ColumnSpec::new("payload", LogicalType::Blob),
        };
        assert_eq!(
            req.build(Dialect::Sqlite).unwrap().sql,
            "ALTER TABLE t ADD COLUMN payload BLOB"
        );
        assert_eq!(
            req.build(Dialect::Postgres).unwrap().sql,
            "ALTER TABLE t ADD COLUMN payload BYTEA"
        );
    }

    #[test]
    fn add_column_rejects_keyword_collision_per_type() {
        for ty in LogicalType::ALL {
            for reserved in ty.reserved_names() {
                let req = StatementRequest::AddColumn {
                    table: "t".into(),
                    column: ColumnSpec::new(reserved.to_uppercase(), ty),
                };
                assert!(
                    matches!(
                        req.build(Dialect::Sqlite),
                        Err(SqlConduitError::InvalidArgument(_))
                    ),
                    "{ty} / {reserved}"
                );
            }
        }
    }

    #[test]
    fn insert_binds_values_in_order() {
        let req = StatementRequest::Insert {
            table: "t".into(),
            columns: vec![
                (ColumnSpec::new("a", LogicalType::Int), SqlValue::Int(1)),
                (
                    ColumnSpec::new("b", LogicalType::Text),
                    SqlValue::Text("x".into()),
                ),
            ],
        };
        let built = req.build(Dialect::Sqlite).unwrap();
        assert_eq!(built.sql, "INSERT INTO t (a, b) VALUES (?1, ?2)");
        assert_eq!(
            built.params,
            vec![SqlValue::Int(1), SqlValue::Text("x".into())]
        );
        let built = req.build(Dialect::Postgres).unwrap();
        assert_eq!(built.sql, "INSERT INTO t (a, b) VALUES ($1, $2)");
    }

    #[test]
    fn update_keeps_condition_verbatim() {
        let req = StatementRequest::Update {
            table: "t".into(),
            columns: vec![(
                ColumnSpec::new("name", LogicalType::Text),
                SqlValue::Text("world".into()),
            )],
            condition: "id = 1 AND name <> ''".into(),
        };
        let built = req.build(Dialect::Sqlite).unwrap();
        assert_eq!(
            built.sql,
            "UPDATE t SET name = ?1 WHERE id = 1 AND name <> ''"
        );
    }

    #[test]
    fn select_limits_to_first_row_and_rewrites_all() {
        for sentinel in ["all", "ALL", "All"] {
            let req = StatementRequest::Select {
                table: "t".into(),
                column: sentinel.into(),
                ty: LogicalType::Text,
                condition: "id = 1".into(),
            };
            assert_eq!(
                req.build(Dialect::Sqlite).unwrap().sql,
                "SELECT * FROM t WHERE id = 1 LIMIT 1"
            );
        }
        let req = StatementRequest::Select {
            table: "t".into(),
            column: "name".into(),
            ty: LogicalType::Text,
            condition: "id = 1".into(),
        };
        assert_eq!(
            req.build(Dialect::Postgres).unwrap().sql,
            "SELECT name FROM t WHERE id = 1 LIMIT 1"
        );
    }

    #[test]
    fn empty_condition_is_rejected() {
        let req = StatementRequest::Select {
            table: "t".into(),
            column: "name".into(),
            ty: LogicalType::Text,
            condition: String::new(),
        };
        assert!(matches!(
            req.build(Dialect::Sqlite),
            Err(SqlConduitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn bad_table_identifier_is_rejected() {
        let req = StatementRequest::CreateTable {
            table: "t; DROP TABLE users".into(),
        };
        assert!(matches!(
            req.build(Dialect::Sqlite),
            Err(SqlConduitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn render_inline_escapes_values() {
        let built = insert_req(SqlValue::Text("O'Brien".into()))
            .render_inline(Dialect::Sqlite)
            .unwrap();
        assert_eq!(built, "INSERT INTO t (name) VALUES ('O''Brien')");
    }

    #[test]
    fn render_inline_keeps_placeholder_shaped_condition_text_verbatim() {
        let req = StatementRequest::Update {
            table: "t".into(),
            columns: vec![(
                ColumnSpec::new("name", LogicalType::Text),
                SqlValue::Text("world".into()),
            )],
            condition: "note = '?1'".into(),
        };
        assert_eq!(
            req.render_inline(Dialect::Sqlite).unwrap(),
            "UPDATE t SET name = 'world' WHERE note = '?1'"
        );
        let req = StatementRequest::Update {
            table: "t".into(),
            columns: vec![(
                ColumnSpec::new("name", LogicalType::Text),
                SqlValue::Text("world".into()),
            )],
            condition: "note = '$1'".into(),
        };
        assert_eq!(
            req.render_inline(Dialect::Postgres).unwrap(),
            "UPDATE t SET name = 'world' WHERE note = '$1'"
        );
    }

    #[test]
    fn render_inline_emits_all_literals_in_order() {
        let columns = (0..11)
            .map(|i| {
                (
                    ColumnSpec::new(format!("c{i}"), LogicalType::Int),
                    SqlValue::Int(i),
                )
            })
            .collect();
        let req = StatementRequest::Insert {
            table: "t".into(),
            columns,
        };
        let sql = req.render_inline(Dialect::Postgres).unwrap();
        assert!(sql.ends_with("VALUES (0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10)"));
    }
}
