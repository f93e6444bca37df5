//! Module: executor
//! Responsibility: the execution boundary. The core assembles statements;
//! a backend-provided executor runs them and materializes rows.

use crate::sql::SqlStatement;
use thiserror::Error as ThisError;

///
/// ExecuteError
///
/// Failures at or beyond the execution boundary. Backend causes are
/// carried as text since driver error types live outside this crate.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExecuteError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation '{operation}' expected at most one row, found {found}")]
    TooManyRows { operation: String, found: usize },
}

///
/// StatementExecutor
///
/// The seam a database driver implements. `execute` runs a mutation and
/// reports affected rows; `query` runs a read and returns driver rows.
/// Row decoding stays on the driver side of the seam.
///

pub trait StatementExecutor {
    type Row;

    fn execute(&mut self, statement: &SqlStatement) -> Result<u64, ExecuteError>;

    fn query(&mut self, statement: &SqlStatement) -> Result<Vec<Self::Row>, ExecuteError>;
}
