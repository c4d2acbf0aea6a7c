//! Postgres backend: `tokio-postgres` with one connection per acquire. The
//! driver future runs on a spawned task that is joined when the connection is
//! released.

mod params;
mod query;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::task::JoinHandle;
use tokio_postgres::NoTls;

use crate::connection::{ConnectionProvider, ConnectionTarget, PerCallConnection};
use crate::error::{BackendFailure, SqlConduitError};
use crate::results::ResultSet;
use crate::statement::Dialect;
use crate::types::SqlValue;

use params::Params;

// Accepts "scheme://host:port", "host:port", or a bare host.
static HOST_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*://)?([^:/?#]+)(?::(\d{1,5}))?")
        .expect("host/port regex")
});

fn parse_host_port(url: &str) -> Result<(String, u16), SqlConduitError> {
    let captures = HOST_PORT
        .captures(url)
        .ok_or_else(|| SqlConduitError::invalid(format!("url `{url}` has no host")))?;
    let host = captures
        .get(1)
        .ok_or_else(|| SqlConduitError::invalid(format!("url `{url}` has no host")))?
        .as_str()
        .to_owned();
    let port = match captures.get(2) {
        Some(m) => m
            .as_str()
            .parse::<u16>()
            .map_err(|_| SqlConduitError::invalid(format!("url `{url}` has an invalid port")))?,
        None => 5432,
    };
    Ok((host, port))
}

/// Opens one Postgres connection per acquire.
#[derive(Debug)]
pub struct PostgresProvider {
    target: ConnectionTarget,
}

impl PostgresProvider {
    #[must_use]
    pub fn new(target: ConnectionTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    async fn acquire(
        &self,
        database_override: Option<&str>,
    ) -> Result<PerCallConnection, SqlConduitError> {
        let database = self.target.resolve_database(database_override)?;
        let (host, port) = parse_host_port(&self.target.url)?;
        tracing::debug!(host = %host, port, database = %database, "opening postgres connection");

        let mut config = tokio_postgres::Config::new();
        config
            .host(&host)
            .port(port)
            .user(&self.target.username)
            .password(&self.target.password)
            .dbname(database);
        let (client, connection) = config.connect(NoTls).await.map_err(connect_failure)?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection task ended with error");
            }
        });

        let conn = PostgresConnection { client, driver };
        // Database-selection round trip before the connection is handed out.
        match conn.confirm_database(database).await {
            Ok(()) => Ok(PerCallConnection::Postgres(conn)),
            Err(e) => {
                conn.close().await;
                Err(e)
            }
        }
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

/// A single per-call Postgres connection plus its driver task.
pub struct PostgresConnection {
    client: tokio_postgres::Client,
    driver: JoinHandle<()>,
}

impl PostgresConnection {
    /// Release the connection: dropping the client ends the driver future,
    /// which is then joined so nothing outlives the call.
    pub async fn close(self) {
        drop(self.client);
        let _ = self.driver.await;
    }

    async fn confirm_database(&self, expected: &str) -> Result<(), SqlConduitError> {
        let row = self
            .client
            .query_one("SELECT current_database()", &[])
            .await
            .map_err(connect_failure)?;
        let current: String = row.try_get(0).map_err(connect_failure)?;
        if current == expected {
            Ok(())
        } else {
            Err(SqlConduitError::Connection(BackendFailure::from_message(
                format!("connected to database `{current}` instead of `{expected}`"),
            )))
        }
    }
}

impl std::fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnection").finish_non_exhaustive()
    }
}

/// Execute a DML/DDL statement and return rows affected.
pub(crate) async fn execute_dml(
    conn: &PostgresConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<usize, SqlConduitError> {
    let converted = Params::convert(params);
    let affected = conn
        .client
        .execute(sql, &converted.as_refs())
        .await
        .map_err(execution_failure)?;
    usize::try_from(affected).map_err(|e| {
        SqlConduitError::Execution(BackendFailure::from_message(format!(
            "postgres affected rows conversion error: {e}"
        )))
    })
}

/// Execute a SELECT and materialize a [`ResultSet`].
pub(crate) async fn execute_select(
    conn: &PostgresConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<ResultSet, SqlConduitError> {
    let converted = Params::convert(params);
    let rows = conn
        .client
        .query(sql, &converted.as_refs())
        .await
        .map_err(execution_failure)?;
    query::result_set_from_rows(&rows)
}

fn backend_failure(e: &tokio_postgres::Error) -> BackendFailure {
    if let Some(db_error) = e.as_db_error() {
        BackendFailure {
            code: None,
            state: Some(db_error.code().code().to_string()),
            message: db_error.message().to_string(),
        }
    } else {
        BackendFailure::from_message(e.to_string())
    }
}

pub(crate) fn connect_failure(e: tokio_postgres::Error) -> SqlConduitError {
    SqlConduitError::Connection(backend_failure(&e))
}

pub(crate) fn execution_failure(e: tokio_postgres::Error) -> SqlConduitError {
    SqlConduitError::Execution(backend_failure(&e))
}
