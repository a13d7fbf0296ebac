//! Error types for lm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction control error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Executed SQL ended the transaction early; statements before the early
    /// `COMMIT` / `ROLLBACK` were not rolled back (D004)
    #[error("[D004] Transaction ended early by executed SQL, earlier statements may be committed: {0}")]
    TransactionEnded(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
