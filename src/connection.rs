//! Connection acquisition: one fresh connection per call, no pooling, no
//! reuse. Providers validate their inputs before touching the network and
//! classify driver failures into [`SqlConduitError::Connection`].

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SqlConduitError;
use crate::ident;
use crate::statement::Dialect;

/// Credentials and location of the database this client talks to.
///
/// Immutable once constructed; every field must be non-empty. The SQLite
/// backend treats `database_name` as the file path / URI and ignores the
/// other fields beyond validation.
#[derive(Clone, Serialize)]
pub struct ConnectionTarget {
    pub url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database_name: String,
}

impl ConnectionTarget {
    /// Validate and build a target.
    ///
    /// # Errors
    /// Returns `SqlConduitError::InvalidArgument` if any field is empty.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Result<Self, SqlConduitError> {
        let target = Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            database_name: database_name.into(),
        };
        ident::require_non_empty("url", &target.url)?;
        ident::require_non_empty("username", &target.username)?;
        ident::require_non_empty("password", &target.password)?;
        ident::require_non_empty("database name", &target.database_name)?;
        Ok(target)
    }

    /// Resolve the database to connect to, honoring a per-call override.
    ///
    /// # Errors
    /// Returns `SqlConduitError::InvalidArgument` for an empty override.
    pub fn resolve_database<'a>(
        &'a self,
        database_override: Option<&'a str>,
    ) -> Result<&'a str, SqlConduitError> {
        match database_override {
            Some(name) => {
                ident::require_non_empty("database name override", name)?;
                Ok(name)
            }
            None => Ok(&self.database_name),
        }
    }
}

// Credentials must not leak into logs.
impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database_name", &self.database_name)
            .finish()
    }
}

/// A live backend connection owned by a single operation invocation.
#[derive(Debug)]
pub enum PerCallConnection {
    #[cfg(feature = "postgres")]
    Postgres(crate::postgres::PostgresConnection),
    #[cfg(feature = "sqlite")]
    Sqlite(crate::sqlite::SqliteConnection),
}

impl PerCallConnection {
    /// Release the connection. Consumes self so a released connection cannot
    /// be used again.
    pub async fn close(self) {
        match self {
            #[cfg(feature = "postgres")]
            PerCallConnection::Postgres(conn) => conn.close().await,
            #[cfg(feature = "sqlite")]
            PerCallConnection::Sqlite(conn) => conn.close().await,
        }
    }
}

/// Resolves a [`ConnectionTarget`] into a live connection, once per call.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Open a fresh connection, optionally to a different database than the
    /// target's default. Implementations perform a database-selection round
    /// trip before handing the connection out.
    async fn acquire(
        &self,
        database_override: Option<&str>,
    ) -> Result<PerCallConnection, SqlConduitError>;

    /// The statement dialect this provider's connections speak.
    fn dialect(&self) -> Dialect;
}
