//! Error types for lm-core

use thiserror::Error;

/// Core error type for labmig
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Invalid bookkeeping table name
    #[error("[E003] Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// E004: Invalid migration file name
    #[error("[E004] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E005: IO error with file path context
    #[error("[E005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E006: YAML parse error
    #[error("[E006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
