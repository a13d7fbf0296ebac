//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use duckdb::Connection;
use lm_core::DatabaseConfig;
use std::path::Path;

/// DuckDB database backend
///
/// Single-threaded: the migration engine issues one blocking call at a time,
/// so the connection is owned directly without a `Mutex`.
pub struct DuckDbBackend {
    conn: Connection,
}

/// Handle to an open transaction, passed to the body of
/// [`DuckDbBackend::transaction`].
///
/// Operations that must only happen inside a transaction take a
/// `&Transaction` so they cannot be called standalone.
pub struct Transaction<'c> {
    conn: &'c Connection,
    id: i64,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open the database described by `config`
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        log::debug!("Opening database at {}", config.path);
        Self::new(&config.path)
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute one or more SQL statements outside of an explicit transaction
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Execute a query and return the number of rows it produces
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    /// Check if a table or view exists.
    ///
    /// `schema` defaults to `main` when `None`.
    pub fn relation_exists(&self, schema: Option<&str>, name: &str) -> DbResult<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema.unwrap_or("main"), name],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    ///
    /// A failed `COMMIT` is also rolled back and reported as
    /// [`DbError::TransactionError`]. Errors from `ROLLBACK` itself are logged
    /// and the original error is returned.
    ///
    /// If SQL run by `body` ends the transaction itself (a `COMMIT` or
    /// `ROLLBACK` inside a script), nothing is committed or rolled back on its
    /// behalf and [`DbError::TransactionEnded`] is returned: statements before
    /// the early end were already committed by the database.
    pub fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let id = match current_transaction_id(&self.conn) {
            Ok(id) => id,
            Err(e) => {
                self.rollback();
                return Err(DbError::TransactionError(format!(
                    "could not read transaction id: {e}"
                )));
            }
        };
        let tx = Transaction {
            conn: &self.conn,
            id,
        };
        let result = body(&tx);

        if !tx.is_open() {
            self.discard_foreign_transaction();
            return Err(match result {
                Err(e @ DbError::TransactionEnded(_)) => e,
                Err(e) => DbError::TransactionEnded(e.to_string()),
                Ok(_) => DbError::TransactionEnded(ENDED_BY_BODY.to_string()),
            });
        }

        match result {
            Ok(value) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    self.rollback();
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
                Ok(value)
            }
            Err(e) => {
                self.rollback();
                Err(e)
            }
        }
    }

    fn rollback(&self) {
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            log::warn!("ROLLBACK failed: {e}");
        }
    }

    /// Roll back a transaction the body may have opened after ending ours.
    /// Usually there is none, so failure is expected.
    fn discard_foreign_transaction(&self) {
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            log::debug!("No transaction left open after early end: {e}");
        }
    }
}

const ENDED_BY_BODY: &str = "COMMIT or ROLLBACK issued inside the transaction";

/// Id of the transaction the next statement runs in. Outside an explicit
/// transaction every statement gets a fresh id.
fn current_transaction_id(conn: &Connection) -> duckdb::Result<i64> {
    conn.query_row("SELECT CAST(txid_current() AS BIGINT)", [], |row| {
        row.get(0)
    })
}

impl Transaction<'_> {
    /// Execute one or more SQL statements verbatim
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Execute a single parameterized statement, returning affected rows
    pub fn execute<P: duckdb::Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    /// Fail with [`DbError::TransactionEnded`] if executed SQL has ended this
    /// transaction.
    pub fn ensure_open(&self) -> DbResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DbError::TransactionEnded(ENDED_BY_BODY.to_string()))
        }
    }

    fn is_open(&self) -> bool {
        match current_transaction_id(self.conn) {
            Ok(id) => id == self.id,
            // An aborted transaction rejects every statement until ROLLBACK,
            // so it is still ours.
            Err(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
