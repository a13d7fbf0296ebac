//! Error types for the migration engine.
//!
//! Every variant is fatal to the run; nothing is retried. Callers branch on
//! [`MigrateError::kind`] rather than on message text.

use lm_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Migration definitions could not be read (MG001).
    #[error("[MG001] Failed to load migrations from {location}: {message}")]
    Loader { location: String, message: String },

    /// The bookkeeping table could not be created or queried (MG002).
    #[error("[MG002] Migration bookkeeping table '{table}' unavailable: {source}")]
    StoreInitialization {
        table: String,
        #[source]
        source: DbError,
    },

    /// An applied migration's content no longer matches its recorded digest (MG003).
    #[error("[MG003] Checksum mismatch for applied migration '{filename}': recorded {recorded}, found {actual}")]
    ChecksumMismatch {
        filename: String,
        recorded: String,
        actual: String,
    },

    /// A pending migration's script or bookkeeping insert failed (MG004).
    ///
    /// The transaction was rolled back unless `source` is
    /// [`DbError::TransactionEnded`], meaning the script ended it itself.
    #[error("[MG004] Migration '{filename}' failed: {source}")]
    ScriptExecution {
        filename: String,
        #[source]
        source: DbError,
    },

    /// A new migration file could not be created (MG005).
    #[error("[MG005] Failed to create migration '{path}': {message}")]
    CreateFailed { path: String, message: String },
}

/// Error category, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateErrorKind {
    Loader,
    StoreInitialization,
    ChecksumMismatch,
    ScriptExecution,
    CreateFailed,
}

impl MigrateError {
    /// The category of this error.
    pub fn kind(&self) -> MigrateErrorKind {
        match self {
            MigrateError::Loader { .. } => MigrateErrorKind::Loader,
            MigrateError::StoreInitialization { .. } => MigrateErrorKind::StoreInitialization,
            MigrateError::ChecksumMismatch { .. } => MigrateErrorKind::ChecksumMismatch,
            MigrateError::ScriptExecution { .. } => MigrateErrorKind::ScriptExecution,
            MigrateError::CreateFailed { .. } => MigrateErrorKind::CreateFailed,
        }
    }

    /// The migration file implicated by this error, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            MigrateError::ChecksumMismatch { filename, .. }
            | MigrateError::ScriptExecution { filename, .. } => Some(filename),
            _ => None,
        }
    }

    pub(crate) fn loader(location: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Loader {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
