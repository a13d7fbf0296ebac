//! Integration tests for the migration engine.
//!
//! These tests drive the public API end to end: migrations are written to a
//! temporary directory, applied to a file-backed DuckDB database, and the
//! database is reopened between runs the way a redeployed process would.

use lm_core::{compute_checksum, TableName};
use lm_db::DuckDbBackend;
use lm_migrate::{DirectorySource, MigrateErrorKind, MigrationStore, RunReport, Runner};
use std::fs;
use std::path::{Path, PathBuf};

// ── Helpers ────────────────────────────────────────────────────────────

struct Project {
    _dir: tempfile::TempDir,
    migrations: PathBuf,
    db_path: PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let migrations = dir.path().join("migrations");
        fs::create_dir(&migrations).unwrap();
        let db_path = dir.path().join("colony.duckdb");
        Self {
            _dir: dir,
            migrations,
            db_path,
        }
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.migrations.join(name), content).unwrap();
    }

    fn open(&self) -> DuckDbBackend {
        DuckDbBackend::from_path(&self.db_path).unwrap()
    }

    /// Run the engine against a freshly opened connection.
    fn run(&self) -> lm_migrate::MigrateResult<RunReport> {
        let db = self.open();
        let store = MigrationStore::new(&db, TableName::default());
        let source = DirectorySource::new(&self.migrations);
        Runner::new(&source, &store).run()
    }

    /// `(filename, checksum)` rows of the bookkeeping table, in id order.
    fn records(&self) -> Vec<(String, String)> {
        let db = self.open();
        let store = MigrationStore::new(&db, TableName::default());
        store
            .get_applied()
            .unwrap()
            .into_iter()
            .map(|r| (r.filename.into_inner(), r.checksum))
            .collect()
    }
}

fn count(db: &DuckDbBackend, sql: &str) -> usize {
    db.query_count(sql).unwrap()
}

const INIT: &str = "CREATE TABLE animals (\n    id INTEGER PRIMARY KEY,\n    tag VARCHAR NOT NULL\n);\n";
const ADD_COL: &str = "ALTER TABLE animals ADD COLUMN strain VARCHAR;\n";

fn file_checksum(dir: &Path, name: &str) -> String {
    compute_checksum(fs::read(dir.join(name)).unwrap())
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn scenario_a_applies_both_in_order() {
    let project = Project::new();
    project.write("001_init.sql", INIT);
    project.write("002_add_col.sql", ADD_COL);

    let report = project.run().unwrap();

    assert_eq!(report.applied, vec!["001_init.sql", "002_add_col.sql"]);
    assert_eq!(
        project.records(),
        vec![
            (
                "001_init.sql".to_string(),
                file_checksum(&project.migrations, "001_init.sql")
            ),
            (
                "002_add_col.sql".to_string(),
                file_checksum(&project.migrations, "002_add_col.sql")
            ),
        ]
    );
}

#[test]
fn scenario_b_second_run_is_noop() {
    let project = Project::new();
    project.write("001_init.sql", INIT);
    project.write("002_add_col.sql", ADD_COL);
    project.write(
        "003_seed.sql",
        "INSERT INTO animals (id, tag) VALUES (1, 'M-001');\n",
    );

    project.run().unwrap();
    let after_first = project.records();

    let report = project.run().unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.verified, 3);
    assert_eq!(project.records(), after_first);
    assert_eq!(count(&project.open(), "SELECT * FROM animals"), 1);
}

#[test]
fn scenario_c_tampered_file_is_reported() {
    let project = Project::new();
    project.write("001_init.sql", INIT);
    project.write("002_add_col.sql", ADD_COL);
    project.run().unwrap();
    let before = project.records();

    project.write(
        "001_init.sql",
        "CREATE TABLE animals (id INTEGER PRIMARY KEY);\n",
    );
    project.write("003_samples.sql", "CREATE TABLE samples (id INTEGER);\n");

    let err = project.run().unwrap_err();

    assert_eq!(err.kind(), MigrateErrorKind::ChecksumMismatch);
    assert_eq!(err.filename(), Some("001_init.sql"));
    assert!(err.to_string().contains("001_init.sql"));
    assert_eq!(project.records(), before);
    assert!(!project.open().relation_exists(None, "samples").unwrap());
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn each_migration_commits_before_the_next_begins() {
    let project = Project::new();
    project.write(
        "000_log.sql",
        "CREATE TABLE run_log (seq INTEGER, name VARCHAR);",
    );
    for name in ["003_c", "001_a", "010_d", "002_b"] {
        project.write(
            &format!("{name}.sql"),
            &format!(
                "INSERT INTO run_log SELECT COUNT(*) + 1, '{name}' FROM run_log;"
            ),
        );
    }

    project.run().unwrap();

    let db = project.open();
    let mut stmt = db
        .conn()
        .prepare("SELECT name FROM run_log ORDER BY seq")
        .unwrap();
    let order: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(order, vec!["001_a", "002_b", "003_c", "010_d"]);

    let names: Vec<String> = project.records().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec!["000_log.sql", "001_a.sql", "002_b.sql", "003_c.sql", "010_d.sql"]
    );
}

#[test]
fn failing_migration_leaves_no_trace() {
    let project = Project::new();
    project.write("001_init.sql", INIT);
    project.write(
        "002_bad.sql",
        "CREATE TABLE cages (id INTEGER);\nINSERT INTO animals (id) VALUES (1);\n",
    );
    project.write("003_samples.sql", "CREATE TABLE samples (id INTEGER);\n");

    let err = project.run().unwrap_err();

    assert_eq!(err.kind(), MigrateErrorKind::ScriptExecution);
    assert_eq!(err.filename(), Some("002_bad.sql"));
    let names: Vec<String> = project.records().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["001_init.sql"]);

    let db = project.open();
    assert!(!db.relation_exists(None, "cages").unwrap());
    assert!(!db.relation_exists(None, "samples").unwrap());
}

#[test]
fn checksums_survive_restart() {
    let project = Project::new();
    project.write("001_init.sql", INIT);
    project.run().unwrap();

    // A new process recomputes the digest from the same bytes.
    for _ in 0..3 {
        let report = project.run().unwrap();
        assert_eq!(report.verified, 1);
        assert!(report.applied.is_empty());
    }
}

#[test]
fn missing_directory_is_loader_error() {
    let project = Project::new();
    let db = project.open();
    let store = MigrationStore::new(&db, TableName::default());
    let source = DirectorySource::new(project.migrations.join("nope"));

    let err = Runner::new(&source, &store).run().unwrap_err();

    assert_eq!(err.kind(), MigrateErrorKind::Loader);
}

#[test]
fn custom_table_name_is_used() {
    let project = Project::new();
    project.write("001_init.sql", INIT);

    let db = project.open();
    let store = MigrationStore::new(&db, TableName::parse("lims.applied_scripts").unwrap());
    let source = DirectorySource::new(&project.migrations);
    Runner::new(&source, &store).run().unwrap();

    assert!(db.relation_exists(Some("lims"), "applied_scripts").unwrap());
    assert!(!db.relation_exists(None, "schema_migrations").unwrap());
    assert_eq!(count(&db, "SELECT * FROM lims.applied_scripts"), 1);
}
