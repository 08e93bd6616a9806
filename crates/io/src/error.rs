use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SourceError {
    /// File could not be opened or read.
    Io { path: PathBuf, message: String },
    /// SQLite reported an error while opening or querying.
    Sqlite { path: PathBuf, message: String },
    /// CSV could not be parsed (bad quoting, ragged rows, bad header).
    Csv { path: PathBuf, message: String },
    /// The snapshot has no such table.
    UnknownTable { path: PathBuf, table: String },
    /// Exclusion removed every column of the table.
    NoColumns { table: String },
    /// The two snapshots disagree on the retained columns.
    ColumnMismatch { before: Vec<String>, after: Vec<String> },
    /// One snapshot is a CSV export and the other a database. CSV cells are
    /// untyped text, so every typed cell would compare unequal.
    MixedKinds { csv: PathBuf, sqlite: PathBuf },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Sqlite { path, message } => write!(f, "{}: sqlite: {message}", path.display()),
            Self::Csv { path, message } => write!(f, "{}: csv: {message}", path.display()),
            Self::UnknownTable { path, table } => {
                write!(f, "{}: no such table: {table}", path.display())
            }
            Self::NoColumns { table } => {
                write!(f, "table {table}: every column is excluded")
            }
            Self::ColumnMismatch { before, after } => write!(
                f,
                "column mismatch: before has [{}], after has [{}]",
                before.join(", "),
                after.join(", ")
            ),
            Self::MixedKinds { csv, sqlite } => write!(
                f,
                "cannot diff a CSV export ({}) against a SQLite snapshot ({})",
                csv.display(),
                sqlite.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {}
