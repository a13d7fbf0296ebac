//! lm-db - Database layer for labmig
//!
//! This crate owns the DuckDB connection the migration engine runs against
//! and the explicit transaction helper every migration executes inside.

pub mod backend;
pub mod error;

pub use backend::{DuckDbBackend, Transaction};
pub use error::{DbError, DbResult};
