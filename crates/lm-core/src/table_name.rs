//! Validated name of the migration bookkeeping table.
//!
//! The table name is interpolated into DDL, so it is restricted to plain
//! identifiers and quoted on output.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bookkeeping table name.
pub const DEFAULT_TABLE_NAME: &str = "schema_migrations";

/// A bookkeeping table name, optionally schema-qualified (`schema.table`).
///
/// Each component matches `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct TableName {
    schema: Option<String>,
    table: String,
}

impl TableName {
    /// Parse `name` as `table` or `schema.table`.
    pub fn parse(name: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidTableName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = name.split('.');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid("expected 'table' or 'schema.table'"));
        }

        let (schema, table) = match second {
            Some(table) => (Some(first), table),
            None => (None, first),
        };
        for component in schema.iter().chain(std::iter::once(&table)) {
            if !is_plain_identifier(component) {
                return Err(invalid(
                    "identifiers must match [A-Za-z_][A-Za-z0-9_]*",
                ));
            }
        }

        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }

    /// Schema component, if the name was qualified.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Unqualified table component.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Quoted, possibly qualified table reference for use in SQL.
    pub fn quoted(&self) -> String {
        self.qualify(&self.table)
    }

    /// Quoted name of the sequence backing the `id` column.
    pub fn quoted_sequence(&self) -> String {
        self.qualify(&self.sequence_table())
    }

    /// Unquoted, possibly qualified sequence name, as `nextval()` expects it
    /// inside a string literal.
    pub fn sequence_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.sequence_table()),
            None => self.sequence_table(),
        }
    }

    fn sequence_table(&self) -> String {
        format!("{}_id_seq", self.table)
    }

    /// Quoted name of the index on `filename`.
    ///
    /// Index names are never schema-qualified in DuckDB DDL; the index lives
    /// in the schema of its table.
    pub fn quoted_filename_index(&self) -> String {
        quote_ident(&format!("{}_filename_idx", self.table))
    }

    fn qualify(&self, object: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(object)),
            None => quote_ident(object),
        }
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self {
            schema: None,
            table: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.to_string()
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TableName::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Wrap an identifier in double quotes, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
#[path = "table_name_test.rs"]
mod tests;
