//! Task store error types.

use thiserror::Error;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Malformed or missing input (empty title, empty update).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No task with the given id.
    #[error("task not found: {0}")]
    NotFound(i64),

    /// The backend could not be reached or a connection could not be
    /// acquired.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for TaskStoreError {
    /// Splits connectivity failures from other engine errors so callers can
    /// tell an unreachable backend apart from a bad statement.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => Self::Unavailable(err.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;
