//! SQLite backend: `rusqlite` driven through `tokio::task::spawn_blocking`,
//! one connection per acquire. The shared handle is an
//! `Arc<tokio::sync::Mutex<rusqlite::Connection>>` so blocking driver work can
//! move onto the blocking pool while the async side retains ownership.

mod params;
mod query;

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::spawn_blocking;

use crate::connection::{ConnectionProvider, ConnectionTarget, PerCallConnection};
use crate::error::{BackendFailure, SqlConduitError};
use crate::results::ResultSet;
use crate::statement::Dialect;
use crate::types::SqlValue;

pub(crate) use params::to_sqlite_values;

pub type SharedConnection = Arc<Mutex<rusqlite::Connection>>;
/// Non-owning observer of a connection handle's lifetime.
pub type ConnectionWatch = Weak<Mutex<rusqlite::Connection>>;

/// Opens one SQLite connection per acquire; the database name (or override)
/// is the file path or `file:` URI.
#[derive(Debug)]
pub struct SqliteProvider {
    target: ConnectionTarget,
}

impl SqliteProvider {
    #[must_use]
    pub fn new(target: ConnectionTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl ConnectionProvider for SqliteProvider {
    async fn acquire(
        &self,
        database_override: Option<&str>,
    ) -> Result<PerCallConnection, SqlConduitError> {
        let path = self.target.resolve_database(database_override)?.to_owned();
        tracing::debug!(path = %path, "opening sqlite connection");
        let conn = spawn_blocking(move || {
            let flags = rusqlite::OpenFlags::default() | rusqlite::OpenFlags::SQLITE_OPEN_URI;
            rusqlite::Connection::open_with_flags(&path, flags).map_err(connect_failure)
        })
        .await
        .map_err(join_failure)??;
        let conn = SqliteConnection {
            handle: Arc::new(Mutex::new(conn)),
        };
        // Database-selection round trip: prove the file is a usable database
        // before the connection is handed out.
        conn.probe().await?;
        Ok(PerCallConnection::Sqlite(conn))
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}

/// A single per-call SQLite connection.
pub struct SqliteConnection {
    handle: SharedConnection,
}

impl SqliteConnection {
    /// Release the connection; rusqlite closes on drop.
    pub async fn close(self) {
        drop(self.handle);
    }

    /// Downgraded handle for observing this connection's lifetime from the
    /// outside (e.g. provider accounting).
    #[must_use]
    pub fn watch(&self) -> ConnectionWatch {
        Arc::downgrade(&self.handle)
    }

    async fn probe(&self) -> Result<(), SqlConduitError> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(connect_failure)
        })
        .await
    }

    async fn run<F, R>(&self, func: F) -> Result<R, SqlConduitError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlConduitError> + Send + 'static,
        R: Send + 'static,
    {
        let handle = Arc::clone(&self.handle);
        spawn_blocking(move || {
            let mut guard = handle.blocking_lock();
            func(&mut guard)
        })
        .await
        .map_err(join_failure)?
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

/// Execute a DML/DDL statement and return rows affected.
pub(crate) async fn execute_dml(
    conn: &SqliteConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<usize, SqlConduitError> {
    let converted = to_sqlite_values(params);
    let sql_owned = sql.to_owned();
    conn.run(move |conn| {
        let mut stmt = conn.prepare(&sql_owned).map_err(execution_failure)?;
        let refs: Vec<&dyn rusqlite::ToSql> =
            converted.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        stmt.execute(&refs[..]).map_err(execution_failure)
    })
    .await
}

/// Execute a SELECT and materialize a [`ResultSet`].
pub(crate) async fn execute_select(
    conn: &SqliteConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<ResultSet, SqlConduitError> {
    let converted = to_sqlite_values(params);
    let sql_owned = sql.to_owned();
    conn.run(move |conn| {
        let mut stmt = conn.prepare(&sql_owned).map_err(execution_failure)?;
        query::build_result_set(&mut stmt, &converted)
    })
    .await
}

fn backend_failure(e: &rusqlite::Error) -> BackendFailure {
    match e {
        rusqlite::Error::SqliteFailure(ffi, message) => BackendFailure {
            code: Some(ffi.extended_code.to_string()),
            state: Some(format!("{:?}", ffi.code)),
            message: message.clone().unwrap_or_else(|| e.to_string()),
        },
        other => BackendFailure::from_message(other.to_string()),
    }
}

pub(crate) fn connect_failure(e: rusqlite::Error) -> SqlConduitError {
    SqlConduitError::Connection(backend_failure(&e))
}

pub(crate) fn execution_failure(e: rusqlite::Error) -> SqlConduitError {
    SqlConduitError::Execution(backend_failure(&e))
}

fn join_failure(e: tokio::task::JoinError) -> SqlConduitError {
    SqlConduitError::Execution(BackendFailure::from_message(format!(
        "sqlite blocking task join error: {e}"
    )))
}
