//! Schema migration engine for labmig.
//!
//! Applies versioned SQL scripts to a DuckDB database exactly once, in file
//! name order, each inside its own transaction together with its bookkeeping
//! record. Scripts that were already applied are re-hashed on every run and
//! any change is reported as tampering before anything new executes.
//!
//! ```no_run
//! use lm_core::TableName;
//! use lm_db::DuckDbBackend;
//! use lm_migrate::{DirectorySource, MigrationStore, Runner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DuckDbBackend::new("colony.duckdb")?;
//! let store = MigrationStore::new(&db, TableName::default());
//! let source = DirectorySource::new("migrations");
//! let report = Runner::new(&source, &store).run()?;
//! println!("applied {} migration(s)", report.applied.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod runner;
pub mod source;
pub mod store;
pub mod verify;

pub use error::{MigrateError, MigrateErrorKind, MigrateResult};
pub use runner::{MigrationState, MigrationStatus, Plan, RunReport, Runner};
pub use source::{DirectorySource, EmbeddedMigration, EmbeddedSource, MigrationSource};
pub use store::MigrationStore;
