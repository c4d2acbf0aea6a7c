use serde::Serialize;
use thiserror::Error;

/// Backend diagnostics captured when a driver reports a failure.
///
/// Mirrors what the wire protocols expose: a vendor result code where the
/// driver has one (SQLite extended result codes), a state classifier
/// (Postgres SQLSTATE, SQLite primary code), and the driver message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BackendFailure {
    /// Vendor-specific numeric code, when the driver reports one.
    pub code: Option<String>,
    /// Driver state classifier (e.g. SQLSTATE).
    pub state: Option<String>,
    /// Human-readable driver message.
    pub message: String,
}

impl BackendFailure {
    /// Build a failure that only carries a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            state: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(state) = &self.state {
            write!(f, " (state: {state})")?;
        }
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SqlConduitError {
    /// A required input was empty, malformed, or collides with a type keyword.
    /// Raised before any backend call; never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No table name was supplied and the client has no default table.
    #[error("no table name supplied and no default table is configured")]
    MissingTable,

    /// The backend refused or failed to establish a connection.
    #[error("connection failure: {0}")]
    Connection(BackendFailure),

    /// A built statement failed at the backend.
    #[error("execution failure: {0}")]
    Execution(BackendFailure),

    /// A strict select matched zero rows.
    #[error("no row matched the supplied condition")]
    NoSuchRow,

    /// A result cell could not be read as the requested logical type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl SqlConduitError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
