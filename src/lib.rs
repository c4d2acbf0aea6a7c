//! Typed client-side SQL data access with per-call connections.
//!
//! `sql-conduit` wraps Postgres and SQLite behind one surface: a closed set
//! of logical column types, statement construction with bound parameters,
//! and a typed client API where every operation opens a fresh connection and
//! releases it before returning.
//!
//! ```no_run
//! use sql_conduit::{ConnectionTarget, SqlClient};
//!
//! # async fn demo() -> Result<(), sql_conduit::SqlConduitError> {
//! let target = ConnectionTarget::new("file://local", "app", "secret", "app.db")?;
//! let client = SqlClient::sqlite(target).with_default_table("notes");
//! client.create_table("notes").await?;
//! client.create_text_column("body").await?;
//! client.insert_text("body", "hello").await?;
//! let body = client.select_text("body", "id = 1").await?;
//! assert_eq!(body.as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod error;
pub mod executor;
pub mod ident;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use client::{ColumnType, SqlClient, column};
pub use connection::{ConnectionProvider, ConnectionTarget, PerCallConnection};
pub use error::{BackendFailure, SqlConduitError};
pub use executor::{ExecutionResult, SelectOutcome};
pub use results::{ResultSet, Row};
pub use statement::{BuiltStatement, ColumnSpec, Dialect, StatementRequest};
pub use types::{DatabaseType, LogicalType, SqlValue};

#[cfg(feature = "postgres")]
pub use postgres::PostgresProvider;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProvider;
