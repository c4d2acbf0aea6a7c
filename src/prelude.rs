//! Convenience re-exports for typical callers.

pub use crate::client::{ColumnType, SqlClient, column};
pub use crate::connection::{ConnectionProvider, ConnectionTarget};
pub use crate::error::SqlConduitError;
pub use crate::executor::SelectOutcome;
pub use crate::statement::{ColumnSpec, StatementRequest};
pub use crate::types::{DatabaseType, LogicalType, SqlValue};
