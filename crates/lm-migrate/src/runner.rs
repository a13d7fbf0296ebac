//! Migration runner.
//!
//! Composes a [`MigrationSource`], a [`MigrationStore`] and checksum
//! verification into the apply algorithm:
//!
//! 1. ensure the bookkeeping table exists
//! 2. list definitions (sorted by file name)
//! 3. read applied records
//! 4. verify the checksum of every already-applied definition
//! 5. apply each pending definition, in order, each in its own transaction
//!
//! Every applied definition is verified before any pending one runs, so a
//! tampered historical file always stops the run. The first failing script
//! stops the run too; later migrations are never attempted.
//!
//! Only [`Runner::run`] creates the bookkeeping table. [`Runner::plan`],
//! [`Runner::verify`] and [`Runner::status`] treat a missing table as "nothing
//! applied" and leave the database untouched.

use crate::error::{MigrateError, MigrateResult};
use crate::source::MigrationSource;
use crate::store::MigrationStore;
use crate::verify::verify_checksum;
use chrono::{DateTime, Utc};
use lm_core::{AppliedMigrationRecord, MigrationDefinition, MigrationName};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Outcome of a successful [`Runner::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Migrations applied by this run, in application order
    pub applied: Vec<MigrationName>,

    /// Number of previously applied migrations whose checksum was verified
    pub verified: usize,

    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u128,
}

/// What a run would do, computed without executing anything.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Already-applied definitions whose checksum matched
    pub verified: Vec<MigrationName>,

    /// Definitions not yet applied, in application order
    pub pending: Vec<MigrationDefinition>,

    /// Bookkeeping records with no matching definition in the source
    pub missing: Vec<AppliedMigrationRecord>,
}

/// State of one migration as reported by [`Runner::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MigrationState {
    /// Recorded in the bookkeeping table and present in the source
    Applied {
        applied_at: DateTime<Utc>,
        checksum_matches: bool,
    },
    /// Present in the source, not yet applied
    Pending,
    /// Recorded in the bookkeeping table, absent from the source
    Missing { applied_at: DateTime<Utc> },
}

/// One row of [`Runner::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub filename: MigrationName,
    #[serde(flatten)]
    pub state: MigrationState,
}

/// Applies pending migrations from a source to a store.
pub struct Runner<'a> {
    source: &'a dyn MigrationSource,
    store: &'a MigrationStore<'a>,
}

impl<'a> Runner<'a> {
    /// Create a runner over `source` and `store`.
    pub fn new(source: &'a dyn MigrationSource, store: &'a MigrationStore<'a>) -> Self {
        Self { source, store }
    }

    /// Load definitions and applied records without writing anything.
    fn load(
        &self,
    ) -> MigrateResult<(
        Vec<MigrationDefinition>,
        HashMap<MigrationName, AppliedMigrationRecord>,
    )> {
        let definitions = self.source.list()?;
        let records = if self.store.exists()? {
            self.store.get_applied()?
        } else {
            log::debug!("Bookkeeping table {} does not exist yet", self.store.table());
            Vec::new()
        };
        let applied = records
            .into_iter()
            .map(|record| (record.filename.clone(), record))
            .collect::<HashMap<_, _>>();
        log::debug!(
            "{} definition(s) in {}, {} applied record(s) in {}",
            definitions.len(),
            self.source.location(),
            applied.len(),
            self.store.table()
        );
        Ok((definitions, applied))
    }

    /// Verify applied migrations and compute the pending set without
    /// executing anything.
    pub fn plan(&self) -> MigrateResult<Plan> {
        let (definitions, mut applied) = self.load()?;

        let mut verified = Vec::new();
        let mut pending = Vec::new();
        for definition in definitions {
            match applied.remove(&definition.filename) {
                Some(record) => {
                    verify_checksum(&definition, &record)?;
                    verified.push(definition.filename);
                }
                None => pending.push(definition),
            }
        }

        let mut missing: Vec<AppliedMigrationRecord> = applied.into_values().collect();
        missing.sort_by_key(|record| record.id);
        for record in &missing {
            log::warn!(
                "Applied migration '{}' is no longer present in {}",
                record.filename,
                self.source.location()
            );
        }

        if let (Some(first_pending), Some(last_verified)) = (pending.first(), verified.last()) {
            if first_pending.filename < *last_verified {
                log::warn!(
                    "Pending migration '{}' sorts before already-applied '{}'",
                    first_pending.filename,
                    last_verified
                );
            }
        }

        Ok(Plan {
            verified,
            pending,
            missing,
        })
    }

    /// Verify the checksum of every applied migration without applying
    /// anything. Returns the verified names.
    pub fn verify(&self) -> MigrateResult<Vec<MigrationName>> {
        Ok(self.plan()?.verified)
    }

    /// Apply all pending migrations, creating the bookkeeping table first if
    /// needed.
    pub fn run(&self) -> MigrateResult<RunReport> {
        let start = Instant::now();
        self.store.ensure_schema()?;
        let plan = self.plan()?;

        if plan.pending.is_empty() {
            log::info!("No pending migrations ({} verified)", plan.verified.len());
        }

        let mut applied = Vec::with_capacity(plan.pending.len());
        for definition in plan.pending {
            self.apply(&definition)?;
            applied.push(definition.filename);
        }

        if !applied.is_empty() {
            log::info!("Applied {} migration(s)", applied.len());
        }
        Ok(RunReport {
            applied,
            verified: plan.verified.len(),
            elapsed_ms: start.elapsed().as_millis(),
        })
    }

    /// Execute one definition and record it, atomically.
    fn apply(&self, definition: &MigrationDefinition) -> MigrateResult<()> {
        log::info!("Applying migration {}", definition.filename);
        let checksum = definition.checksum();

        self.store
            .db()
            .transaction(|tx| {
                tx.execute_batch(&definition.content)?;
                // A COMMIT in the script would leave the insert in autocommit.
                tx.ensure_open()?;
                self.store
                    .record_applied(tx, &definition.filename, &checksum)
            })
            .map_err(|source| {
                log::error!("Migration {} failed: {}", definition.filename, source);
                MigrateError::ScriptExecution {
                    filename: definition.filename.to_string(),
                    source,
                }
            })
    }

    /// Report the state of every known migration, sorted by file name.
    ///
    /// Checksum mismatches are reported rather than returned as errors.
    pub fn status(&self) -> MigrateResult<Vec<MigrationStatus>> {
        let (definitions, mut applied) = self.load()?;

        let mut rows: BTreeMap<MigrationName, MigrationState> = BTreeMap::new();
        for definition in definitions {
            let state = match applied.remove(&definition.filename) {
                Some(record) => MigrationState::Applied {
                    applied_at: record.applied_at,
                    checksum_matches: verify_checksum(&definition, &record).is_ok(),
                },
                None => MigrationState::Pending,
            };
            rows.insert(definition.filename, state);
        }
        for (filename, record) in applied {
            rows.insert(
                filename,
                MigrationState::Missing {
                    applied_at: record.applied_at,
                },
            );
        }

        Ok(rows
            .into_iter()
            .map(|(filename, state)| MigrationStatus { filename, state })
            .collect())
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
