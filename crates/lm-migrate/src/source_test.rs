use super::*;
use crate::error::MigrateErrorKind;
use chrono::TimeZone;

fn names(definitions: &[MigrationDefinition]) -> Vec<&str> {
    definitions.iter().map(|d| d.filename.as_str()).collect()
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

// ── DirectorySource ────────────────────────────────────────────────────

#[test]
fn directory_lists_sql_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "010_claims.sql", "CREATE TABLE claims (id INT);");
    write(dir.path(), "002_add_col.sql", "ALTER TABLE animals ADD COLUMN sex VARCHAR;");
    write(dir.path(), "001_init.sql", "CREATE TABLE animals (id INT);");

    let source = DirectorySource::new(dir.path());
    let definitions = source.list().unwrap();

    assert_eq!(
        names(&definitions),
        vec!["001_init.sql", "002_add_col.sql", "010_claims.sql"]
    );
    assert_eq!(definitions[0].content, "CREATE TABLE animals (id INT);");
}

#[test]
fn directory_list_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    for i in (0..20).rev() {
        write(dir.path(), &format!("{i:03}_step.sql"), "SELECT 1;");
    }

    let source = DirectorySource::new(dir.path());
    let first = source.list().unwrap();
    let second = source.list().unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].filename, "000_step.sql");
    assert_eq!(first[19].filename, "019_step.sql");
}

#[test]
fn directory_sort_is_bytewise_not_numeric() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "10_b.sql", "");
    write(dir.path(), "9_a.sql", "");
    write(dir.path(), "B.sql", "");
    write(dir.path(), "a.sql", "");

    let definitions = DirectorySource::new(dir.path()).list().unwrap();
    assert_eq!(
        names(&definitions),
        vec!["10_b.sql", "9_a.sql", "B.sql", "a.sql"]
    );
}

#[test]
fn directory_ignores_other_files_and_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "001_init.sql", "SELECT 1;");
    write(dir.path(), "README.md", "docs");
    write(dir.path(), "002_notes.sql.bak", "SELECT 2;");
    fs::create_dir(dir.path().join("003_nested.sql")).unwrap();
    fs::create_dir(dir.path().join("archive")).unwrap();
    write(&dir.path().join("archive"), "000_old.sql", "SELECT 0;");

    let definitions = DirectorySource::new(dir.path()).list().unwrap();
    assert_eq!(names(&definitions), vec!["001_init.sql"]);
}

#[test]
fn directory_empty_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let definitions = DirectorySource::new(dir.path()).list().unwrap();
    assert!(definitions.is_empty());
}

#[test]
fn directory_missing_is_loader_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = DirectorySource::new(&missing).list().unwrap_err();
    assert_eq!(err.kind(), MigrateErrorKind::Loader);
    assert!(err.to_string().contains("directory not found"));
}

#[test]
fn directory_non_utf8_content_is_loader_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("001_bad.sql"), [0xff, 0xfe, 0x00]).unwrap();

    let err = DirectorySource::new(dir.path()).list().unwrap_err();
    assert_eq!(err.kind(), MigrateErrorKind::Loader);
    assert!(err.to_string().contains("001_bad.sql"));
}

// ── EmbeddedSource ─────────────────────────────────────────────────────

static EMBEDDED: &[EmbeddedMigration] = &[
    EmbeddedMigration {
        filename: "002_samples.sql",
        content: "CREATE TABLE samples (id INT);",
    },
    EmbeddedMigration {
        filename: "001_animals.sql",
        content: "CREATE TABLE animals (id INT);",
    },
];

#[test]
fn embedded_lists_sorted() {
    let definitions = EmbeddedSource::new(EMBEDDED).list().unwrap();
    assert_eq!(names(&definitions), vec!["001_animals.sql", "002_samples.sql"]);
    assert_eq!(EmbeddedSource::new(EMBEDDED).location(), "<embedded>");
}

#[test]
fn embedded_duplicate_is_loader_error() {
    let source = EmbeddedSource::from_pairs([
        ("001_init.sql", "SELECT 1;"),
        ("002_next.sql", "SELECT 2;"),
        ("001_init.sql", "SELECT 3;"),
    ]);
    let err = source.list().unwrap_err();
    assert_eq!(err.kind(), MigrateErrorKind::Loader);
    assert!(err.to_string().contains("duplicate migration '001_init.sql'"));
}

#[test]
fn embedded_invalid_name_is_loader_error() {
    let source = EmbeddedSource::from_pairs([("", "SELECT 1;")]);
    assert_eq!(source.list().unwrap_err().kind(), MigrateErrorKind::Loader);

    let source = EmbeddedSource::from_pairs([("nested/001.sql", "SELECT 1;")]);
    assert_eq!(source.list().unwrap_err().kind(), MigrateErrorKind::Loader);
}

// ── create ─────────────────────────────────────────────────────────────

#[test]
fn create_writes_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let migrations = dir.path().join("migrations");
    let source = DirectorySource::new(&migrations);
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();

    let path = source.create("Add Cage Location!", now).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "20240305140709_add_cage_location.sql"
    );
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("-- Migration: Add Cage Location!\n"));

    let definitions = source.list().unwrap();
    assert_eq!(names(&definitions), vec!["20240305140709_add_cage_location.sql"]);
}

#[test]
fn create_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let source = DirectorySource::new(dir.path());
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();

    source.create("samples", now).unwrap();
    let err = source.create("samples", now).unwrap_err();
    assert_eq!(err.kind(), MigrateErrorKind::CreateFailed);
}

#[test]
fn create_rejects_empty_slug() {
    let dir = tempfile::tempdir().unwrap();
    let source = DirectorySource::new(dir.path());
    let err = source.create(" -- ", Utc::now()).unwrap_err();
    assert_eq!(err.kind(), MigrateErrorKind::CreateFailed);
}

#[test]
fn slugify_collapses_separators() {
    assert_eq!(slugify("Add cage  location"), "add_cage_location");
    assert_eq!(slugify("__weird--name__"), "weird_name");
    assert_eq!(slugify("v2 claims"), "v2_claims");
}
