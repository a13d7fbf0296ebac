//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use lm_core::{Config, CoreError, DatabaseConfig};
use lm_db::DuckDbBackend;
use lm_migrate::{DirectorySource, MigrateError, MigrationStore};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Exit code for engine failures (loader, store, checksum, script).
pub(crate) const EXIT_FAILURE: i32 = 1;

/// Exit code for usage and configuration errors.
pub(crate) const EXIT_USAGE: i32 = 2;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command has already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Map an error returned by a command to a process exit code.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
        return *code;
    }
    if err.downcast_ref::<CoreError>().is_some() {
        return EXIT_USAGE;
    }
    EXIT_FAILURE
}

/// Resolved project: root directory and effective configuration.
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Directory holding the migration files.
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    /// Source over the project's migrations directory.
    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(self.migrations_dir())
    }

    /// Open the configured database.
    pub fn open_db(&self) -> Result<DuckDbBackend> {
        let database = DatabaseConfig {
            path: self.config.database_path_absolute(&self.root),
        };
        DuckDbBackend::open(&database)
            .with_context(|| format!("Failed to open database: {}", database.path))
    }

    /// Bookkeeping store over `db`.
    pub fn store<'db>(&self, db: &'db DuckDbBackend) -> MigrationStore<'db> {
        MigrationStore::new(db, self.config.table.clone())
    }
}

/// Load the project configuration, applying global overrides.
///
/// An explicit `--config` must exist; otherwise a missing config file in the
/// project directory means defaults.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = PathBuf::from(&global.project_dir);

    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::load_from_dir_or_default(&root)?,
    };

    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }

    log::debug!(
        "Project {}: migrations in '{}', table {}, database {}",
        root.display(),
        config.migrations_dir,
        config.table,
        config.database.path
    );

    Ok(ProjectContext { root, config })
}

/// Print an engine error and convert it to the failure exit code.
pub(crate) fn report_failure(err: MigrateError) -> anyhow::Error {
    match err.filename() {
        Some(filename) => eprintln!("Error ({:?}, {}): {}", err.kind(), filename, err),
        None => eprintln!("Error ({:?}): {}", err.kind(), err),
    }
    ExitCode(EXIT_FAILURE).into()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
