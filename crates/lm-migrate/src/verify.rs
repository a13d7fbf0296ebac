//! Checksum verification of already-applied migrations.

use crate::error::{MigrateError, MigrateResult};
use lm_core::{AppliedMigrationRecord, MigrationDefinition};

/// Compare a definition's current digest against the digest recorded when it
/// was applied.
pub fn verify_checksum(
    definition: &MigrationDefinition,
    record: &AppliedMigrationRecord,
) -> MigrateResult<()> {
    let actual = definition.checksum();
    if actual == record.checksum {
        Ok(())
    } else {
        Err(MigrateError::ChecksumMismatch {
            filename: definition.filename.to_string(),
            recorded: record.checksum.clone(),
            actual,
        })
    }
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
