//! Migration sources.
//!
//! A [`MigrationSource`] produces the full set of migration definitions,
//! sorted by file name. Sorting is done here, after collection, so the
//! order never depends on how a directory or bundle happens to iterate.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use lm_core::{MigrationDefinition, MigrationName};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File extension recognized by [`DirectorySource`].
pub const MIGRATION_EXTENSION: &str = "sql";

/// Produces migration definitions in deterministic order.
pub trait MigrationSource {
    /// Human-readable location used in logs and loader errors.
    fn location(&self) -> String;

    /// Return every definition, sorted ascending by file name (byte-wise).
    fn list(&self) -> MigrateResult<Vec<MigrationDefinition>>;
}

/// Sort definitions by file name and reject duplicates.
fn into_sorted(
    mut definitions: Vec<MigrationDefinition>,
    location: &str,
) -> MigrateResult<Vec<MigrationDefinition>> {
    definitions.sort_by(|a, b| a.filename.cmp(&b.filename));
    if let Some(pair) = definitions
        .windows(2)
        .find(|pair| pair[0].filename == pair[1].filename)
    {
        return Err(MigrateError::loader(
            location,
            format!("duplicate migration '{}'", pair[0].filename),
        ));
    }
    Ok(definitions)
}

// ── Directory ──────────────────────────────────────────────────────────

/// Reads `*.sql` files from a single directory (non-recursive).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source for `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this source reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_definition(&self, path: &Path) -> MigrateResult<MigrationDefinition> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                MigrateError::loader(path.display().to_string(), "file name is not valid UTF-8")
            })?;
        let filename = MigrationName::parse(file_name)
            .map_err(|e| MigrateError::loader(path.display().to_string(), e.to_string()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| MigrateError::loader(path.display().to_string(), e.to_string()))?;
        Ok(MigrationDefinition::new(filename, content))
    }

    /// Create a new, empty migration file named `<timestamp>_<slug>.sql`.
    ///
    /// The directory is created if needed. An existing file is never
    /// overwritten.
    pub fn create(&self, name: &str, now: DateTime<Utc>) -> MigrateResult<PathBuf> {
        let slug = slugify(name);
        let filename = format!(
            "{}_{}.{}",
            now.format("%Y%m%d%H%M%S"),
            slug,
            MIGRATION_EXTENSION
        );
        let path = self.dir.join(&filename);
        let create_failed = |message: String| MigrateError::CreateFailed {
            path: path.display().to_string(),
            message,
        };

        if slug.is_empty() {
            return Err(create_failed(format!(
                "name '{name}' has no usable characters"
            )));
        }

        fs::create_dir_all(&self.dir).map_err(|e| create_failed(e.to_string()))?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| create_failed(e.to_string()))?;
        let template = format!(
            "-- Migration: {name}\n-- Created: {}\n\n",
            now.format("%Y-%m-%d %H:%M:%S UTC")
        );
        file.write_all(template.as_bytes())
            .map_err(|e| create_failed(e.to_string()))?;

        log::info!("Created migration {}", path.display());
        Ok(path)
    }
}

impl MigrationSource for DirectorySource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn list(&self) -> MigrateResult<Vec<MigrationDefinition>> {
        let location = self.location();
        if !self.dir.is_dir() {
            return Err(MigrateError::loader(location, "directory not found"));
        }

        let entries =
            fs::read_dir(&self.dir).map_err(|e| MigrateError::loader(&location, e.to_string()))?;

        let mut definitions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MigrateError::loader(&location, e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension() != Some(OsStr::new(MIGRATION_EXTENSION)) {
                continue;
            }
            definitions.push(self.read_definition(&path)?);
        }

        log::debug!(
            "Found {} migration file(s) in {}",
            definitions.len(),
            location
        );
        into_sorted(definitions, &location)
    }
}

/// Lowercase `name`, replacing every run of non-alphanumeric characters with
/// a single underscore.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

// ── Embedded ───────────────────────────────────────────────────────────

/// A migration compiled into the binary, typically via `include_str!`.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedMigration {
    /// File name, the sort key
    pub filename: &'static str,
    /// Raw script text
    pub content: &'static str,
}

/// Serves definitions held in memory.
///
/// ```
/// use lm_migrate::source::{EmbeddedMigration, EmbeddedSource, MigrationSource};
///
/// static MIGRATIONS: &[EmbeddedMigration] = &[
///     EmbeddedMigration { filename: "002_samples.sql", content: "CREATE TABLE samples (id INT);" },
///     EmbeddedMigration { filename: "001_animals.sql", content: "CREATE TABLE animals (id INT);" },
/// ];
///
/// let source = EmbeddedSource::new(MIGRATIONS);
/// let names: Vec<String> = source.list().unwrap().into_iter().map(|d| d.filename.into_inner()).collect();
/// assert_eq!(names, vec!["001_animals.sql", "002_samples.sql"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSource {
    migrations: Vec<(String, String)>,
}

impl EmbeddedSource {
    /// Create a source over a static migration table.
    pub fn new(migrations: &'static [EmbeddedMigration]) -> Self {
        Self::from_pairs(migrations.iter().map(|m| (m.filename, m.content)))
    }

    /// Create a source from `(filename, content)` pairs.
    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            migrations: pairs
                .into_iter()
                .map(|(name, content)| (name.into(), content.into()))
                .collect(),
        }
    }
}

impl MigrationSource for EmbeddedSource {
    fn location(&self) -> String {
        "<embedded>".to_string()
    }

    fn list(&self) -> MigrateResult<Vec<MigrationDefinition>> {
        let location = self.location();
        let definitions = self
            .migrations
            .iter()
            .map(|(name, content)| {
                let filename = MigrationName::parse(name.as_str())
                    .map_err(|e| MigrateError::loader(&location, e.to_string()))?;
                Ok(MigrationDefinition::new(filename, content.as_str()))
            })
            .collect::<MigrateResult<Vec<_>>>()?;
        into_sorted(definitions, &location)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
