//! Bookkeeping table access.
//!
//! [`MigrationStore`] creates the table that records applied migrations,
//! reads it back, and inserts new records. Inserts take a
//! [`Transaction`] so they always share the transaction of the script they
//! record.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use lm_core::checksum::is_valid_checksum;
use lm_core::table_name::quote_ident;
use lm_core::{AppliedMigrationRecord, MigrationName, TableName};
use lm_db::{DbError, DbResult, DuckDbBackend, Transaction};

/// Access to the migration bookkeeping table.
pub struct MigrationStore<'db> {
    db: &'db DuckDbBackend,
    table: TableName,
}

impl<'db> MigrationStore<'db> {
    /// Create a store over `db` using the bookkeeping table `table`.
    pub fn new(db: &'db DuckDbBackend, table: TableName) -> Self {
        Self { db, table }
    }

    /// The database this store records into.
    pub fn db(&self) -> &'db DuckDbBackend {
        self.db
    }

    /// The bookkeeping table name.
    pub fn table(&self) -> &TableName {
        &self.table
    }

    fn init_error(&self, source: DbError) -> MigrateError {
        MigrateError::StoreInitialization {
            table: self.table.to_string(),
            source,
        }
    }

    /// DDL creating the bookkeeping table, its id sequence, and its index.
    fn schema_sql(&self) -> String {
        let mut sql = String::new();
        if let Some(schema) = self.table.schema() {
            sql.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {};\n", quote_ident(schema)));
        }
        sql.push_str(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {seq} START 1;
             CREATE TABLE IF NOT EXISTS {table} (
                 id         BIGINT PRIMARY KEY DEFAULT nextval('{seq_name}'),
                 filename   VARCHAR NOT NULL UNIQUE,
                 checksum   VARCHAR NOT NULL,
                 applied_at TIMESTAMP NOT NULL DEFAULT now()
             );
             CREATE INDEX IF NOT EXISTS {index} ON {table} (filename);",
            seq = self.table.quoted_sequence(),
            seq_name = self.table.sequence_name(),
            table = self.table.quoted(),
            index = self.table.quoted_filename_index(),
        ));
        sql
    }

    /// Create the bookkeeping table if it does not exist. Safe to call on
    /// every run.
    pub fn ensure_schema(&self) -> MigrateResult<()> {
        log::debug!("Ensuring bookkeeping table {}", self.table);
        self.db
            .execute_batch(&self.schema_sql())
            .map_err(|e| self.init_error(e))
    }

    /// Whether the bookkeeping table exists.
    pub fn exists(&self) -> MigrateResult<bool> {
        self.db
            .relation_exists(self.table.schema(), self.table.table())
            .map_err(|e| self.init_error(e))
    }

    /// Read every applied record, in `id` order.
    pub fn get_applied(&self) -> MigrateResult<Vec<AppliedMigrationRecord>> {
        let sql = format!(
            "SELECT id, filename, checksum, epoch_ms(applied_at) FROM {} ORDER BY id",
            self.table.quoted()
        );
        self.query_applied(&sql).map_err(|e| self.init_error(e))
    }

    fn query_applied(&self, sql: &str) -> DbResult<Vec<AppliedMigrationRecord>> {
        let mut stmt = self.db.conn().prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, filename, checksum, applied_ms) = row?;
            records.push(decode_record(id, filename, checksum, applied_ms)?);
        }
        Ok(records)
    }

    /// Insert a record for `filename` inside the caller's transaction.
    ///
    /// `applied_at` is bound explicitly in UTC rather than left to the column
    /// default, whose value depends on the session time zone.
    pub fn record_applied(
        &self,
        tx: &Transaction<'_>,
        filename: &MigrationName,
        checksum: &str,
    ) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} (filename, checksum, applied_at) VALUES (?, ?, epoch_ms(CAST(? AS BIGINT)))",
            self.table.quoted()
        );
        let applied_ms = Utc::now().timestamp_millis();
        tx.execute(
            &sql,
            duckdb::params![filename.as_str(), checksum, applied_ms],
        )?;
        Ok(())
    }
}

/// Validate a raw bookkeeping row.
fn decode_record(
    id: i64,
    filename: String,
    checksum: String,
    applied_ms: i64,
) -> DbResult<AppliedMigrationRecord> {
    let corrupt = |message: String| DbError::ExecutionError(format!("corrupt record {id}: {message}"));

    let filename = MigrationName::parse(filename).map_err(|e| corrupt(e.to_string()))?;
    if !is_valid_checksum(&checksum) {
        return Err(corrupt(format!("invalid checksum '{checksum}'")));
    }
    let applied_at: DateTime<Utc> = DateTime::from_timestamp_millis(applied_ms)
        .ok_or_else(|| corrupt(format!("applied_at out of range: {applied_ms}")))?;

    Ok(AppliedMigrationRecord {
        id,
        filename,
        checksum,
        applied_at,
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
