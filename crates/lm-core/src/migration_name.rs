//! Strongly-typed migration file name wrapper.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Strongly-typed wrapper for migration file names such as `001_init.sql`.
///
/// The name is the join key between a source definition and its bookkeeping
/// record. `Ord` is the byte-wise order of the underlying `String`, which is
/// the order migrations are applied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationName(String);

impl<'de> Deserialize<'de> for MigrationName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MigrationName::parse(s).map_err(serde::de::Error::custom)
    }
}

impl MigrationName {
    /// Create a new `MigrationName`, panicking if the name is invalid.
    ///
    /// Prefer [`parse`](Self::parse) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        match Self::parse(name) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Validate and wrap a migration name.
    ///
    /// A name must be non-empty, must not contain path separators or NUL, and
    /// must not be `.` or `..`.
    pub fn parse(name: impl Into<String>) -> CoreResult<Self> {
        let s = name.into();
        let reason = if s.is_empty() {
            Some("name must not be empty")
        } else if s == "." || s == ".." {
            Some("name must not be a relative path component")
        } else if s.contains(['/', '\\']) {
            Some("name must not contain path separators")
        } else if s.contains('\0') {
            Some("name must not contain NUL")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidMigrationName {
                name: s,
                reason: reason.to_string(),
            }),
            None => Ok(Self(s)),
        }
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for MigrationName {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MigrationName {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "migration_name_test.rs"]
mod tests;
