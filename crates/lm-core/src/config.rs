//! Configuration types and parsing for labmig.yml

use crate::error::{CoreError, CoreResult};
use crate::table_name::{TableName, DEFAULT_TABLE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["labmig.yml", "labmig.yaml"];

const DEFAULT_DB_PATH: &str = ":memory:";

const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Main project configuration from labmig.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding `*.sql` migration files, relative to the project root
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Bookkeeping table name (`table` or `schema.table`)
    #[serde(default)]
    pub table: TableName,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Returns `true` for an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.path == DEFAULT_DB_PATH
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_dir: default_migrations_dir(),
            table: TableName::default(),
            database: DatabaseConfig::default(),
        }
    }
}

fn default_migrations_dir() -> String {
    DEFAULT_MIGRATIONS_DIR.to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory, falling back to defaults
    /// when no config file exists there.
    /// Looks for labmig.yml, then labmig.yaml
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!(
                    "No config file in {}, using defaults (table '{}')",
                    dir.display(),
                    DEFAULT_TABLE_NAME
                );
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.migrations_dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the absolute migrations directory relative to a project root
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Resolve the database path relative to a project root.
    ///
    /// `:memory:` and absolute paths are returned unchanged.
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.is_memory() || Path::new(&self.database.path).is_absolute() {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
