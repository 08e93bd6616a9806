use std::path::{Path, PathBuf};

use rowdiff_io::sqlite::Snapshot;
use rowdiff_io::{load_snapshot, SourceError};
use rowdiff_recon::{record, Value};
use rusqlite::Connection;
use tempfile::TempDir;

fn make_db(dir: &TempDir, name: &str, statements: &str) -> PathBuf {
    let path = dir.path().join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(statements).unwrap();
    path
}

fn ids() -> Vec<String> {
    vec!["id".to_string()]
}

const PDG_SCHEMA: &str = "
    CREATE TABLE pdgdata (
        id INTEGER PRIMARY KEY,
        pdgid TEXT,
        value REAL,
        unit TEXT,
        note BLOB
    );
";

#[test]
fn loads_rows_in_insert_order_without_excluded_columns() {
    let dir = TempDir::new().unwrap();
    let path = make_db(
        &dir,
        "old.sqlite",
        &format!(
            "{PDG_SCHEMA}
            INSERT INTO pdgdata VALUES (10, 'S008M', 105.66, 'MeV', NULL);
            INSERT INTO pdgdata VALUES (11, 'S009M', 1776.86, 'MeV', x'beef');
            INSERT INTO pdgdata VALUES (12, 'S011M', 80, NULL, NULL);"
        ),
    );

    let table = load_snapshot(&path, "pdgdata", &ids()).unwrap();
    assert_eq!(table.columns, vec!["pdgid", "value", "unit", "note"]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows[0], record!["S008M", 105.66, "MeV", None::<i64>]);
    assert_eq!(table.rows[1][3], Value::Blob(vec![0xbe, 0xef]));
    // REAL affinity stores the integer literal as a real.
    assert_eq!(table.rows[2][1], Value::from(80.0));
    assert_eq!(table.rows[2][2], Value::Null);
}

#[test]
fn unknown_table_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = make_db(&dir, "old.sqlite", PDG_SCHEMA);
    let err = load_snapshot(&path, "nope", &ids()).unwrap_err();
    assert!(matches!(err, SourceError::UnknownTable { ref table, .. } if table == "nope"));
}

#[test]
fn table_names_lists_user_tables() {
    let dir = TempDir::new().unwrap();
    let path = make_db(
        &dir,
        "old.sqlite",
        &format!("{PDG_SCHEMA} CREATE TABLE pdgid (id INTEGER PRIMARY KEY, description TEXT);"),
    );
    let snap = Snapshot::open(&path).unwrap();
    assert_eq!(snap.table_names().unwrap(), vec!["pdgdata", "pdgid"]);
    assert_eq!(snap.path(), path.as_path());
}

#[test]
fn excluding_every_column_fails() {
    let dir = TempDir::new().unwrap();
    let path = make_db(&dir, "one.sqlite", "CREATE TABLE t (id INTEGER);");
    let err = load_snapshot(&path, "t", &ids()).unwrap_err();
    assert!(matches!(err, SourceError::NoColumns { .. }));
}

#[test]
fn quoted_identifiers_survive() {
    let dir = TempDir::new().unwrap();
    let path = make_db(
        &dir,
        "odd.sqlite",
        r#"CREATE TABLE "order" ("select" TEXT, "we""ird" INTEGER);
           INSERT INTO "order" VALUES ('a', 1);"#,
    );
    let table = load_snapshot(&path, "order", &[]).unwrap();
    assert_eq!(table.columns, vec!["select", "we\"ird"]);
    assert_eq!(table.rows, vec![record!["a", 1]]);
}

#[test]
fn csv_snapshot_and_column_check() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("old.csv");
    std::fs::write(&csv_path, "id,pdgid,value\n1,S008M,105.66\n").unwrap();

    let from_csv = load_snapshot(&csv_path, "pdgdata", &ids()).unwrap();
    assert_eq!(from_csv.columns, vec!["pdgid", "value"]);
    assert_eq!(from_csv.rows, vec![record!["S008M", "105.66"]]);

    let db = make_db(&dir, "new.sqlite", PDG_SCHEMA);
    let from_db = load_snapshot(&db, "pdgdata", &ids()).unwrap();
    assert!(matches!(
        from_csv.ensure_same_columns(&from_db),
        Err(SourceError::ColumnMismatch { .. })
    ));
}

#[test]
fn missing_csv_is_io_error() {
    let err = load_snapshot(Path::new("/nonexistent/rowdiff/old.csv"), "t", &[]).unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
}
