//! Migration definition and bookkeeping record types.

use crate::checksum::compute_checksum;
use crate::migration_name::MigrationName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A migration as discovered from a source.
///
/// Regenerated on every run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDefinition {
    /// File name, the unique sort key
    pub filename: MigrationName,

    /// Raw script text, executed verbatim
    pub content: String,
}

impl MigrationDefinition {
    /// Create a new definition.
    pub fn new(filename: MigrationName, content: impl Into<String>) -> Self {
        Self {
            filename,
            content: content.into(),
        }
    }

    /// SHA-256 digest of the content.
    pub fn checksum(&self) -> String {
        compute_checksum(&self.content)
    }
}

/// A row of the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigrationRecord {
    /// Surrogate key, increasing in insertion order
    pub id: i64,

    /// File name of the applied migration
    pub filename: MigrationName,

    /// Digest of the content at the time it was applied
    pub checksum: String,

    /// When the record was inserted
    pub applied_at: DateTime<Utc>,
}
