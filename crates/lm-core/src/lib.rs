//! lm-core - Core library for labmig
//!
//! This crate provides the shared types used across the migration engine:
//! migration names and definitions, bookkeeping records, content checksums,
//! the bookkeeping table name, and `labmig.yml` configuration.

pub mod checksum;
pub mod config;
pub mod error;
pub mod migration;
pub mod migration_name;
pub mod table_name;

pub use checksum::compute_checksum;
pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
pub use migration::{AppliedMigrationRecord, MigrationDefinition};
pub use migration_name::MigrationName;
pub use table_name::TableName;
