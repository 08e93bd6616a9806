// Row sources: load one table of a snapshot as ordered records

pub mod csv;
pub mod error;
pub mod sqlite;
pub mod table;

use std::path::Path;

pub use error::SourceError;
pub use table::Table;

/// Load `table` from the snapshot at `path`, dropping `exclude` columns.
///
/// Files ending in `.csv` are read as CSV exports (the table name only
/// labels the result); anything else is opened as a SQLite database.
pub fn load_snapshot(path: &Path, table: &str, exclude: &[String]) -> Result<Table, SourceError> {
    if is_csv(path) {
        csv::load_csv(path, table, exclude)
    } else {
        sqlite::Snapshot::open(path)?.load_table(table, exclude)
    }
}

/// Both snapshots must be read by the same kind of source.
pub fn ensure_same_kind(before: &Path, after: &Path) -> Result<(), SourceError> {
    match (is_csv(before), is_csv(after)) {
        (true, false) => Err(SourceError::MixedKinds {
            csv: before.to_path_buf(),
            sqlite: after.to_path_buf(),
        }),
        (false, true) => Err(SourceError::MixedKinds {
            csv: after.to_path_buf(),
            sqlite: before.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Column-name exclusion as SQLite sees names: ASCII case-insensitive.
pub(crate) fn is_excluded(column: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|e| e.eq_ignore_ascii_case(column))
}
