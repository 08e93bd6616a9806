// SQLite snapshot reader

use std::path::{Path, PathBuf};

use log::debug;
use rowdiff_recon::{Record, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::error::SourceError;
use crate::table::Table;

/// A database snapshot, opened read-only.
pub struct Snapshot {
    conn: Connection,
    path: PathBuf,
}

impl Snapshot {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        // Read-only open of a missing file reports "unable to open database
        // file"; say what actually happened instead.
        if !path.exists() {
            return Err(SourceError::Io {
                path: path.to_path_buf(),
                message: "no such file".into(),
            });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| sqlite_err(path, e))?;
        debug!("opened snapshot {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// User tables, sorted by name.
    pub fn table_names(&self) -> Result<Vec<String>, SourceError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(|e| self.err(e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| self.err(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.err(e))?;
        Ok(names)
    }

    /// Column names of `table` in declaration order, minus `exclude`.
    pub fn column_names(&self, table: &str, exclude: &[String]) -> Result<Vec<String>, SourceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| self.err(e))?;
        let all = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .map_err(|e| self.err(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.err(e))?;

        if all.is_empty() {
            return Err(SourceError::UnknownTable {
                path: self.path.clone(),
                table: table.to_string(),
            });
        }

        for name in exclude {
            if !all.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                debug!("{table}: excluded column {name} does not exist");
            }
        }

        Ok(all
            .into_iter()
            .filter(|c| !crate::is_excluded(c, exclude))
            .collect())
    }

    /// Every row of `table`, retained columns only, in natural scan order.
    pub fn load_table(&self, table: &str, exclude: &[String]) -> Result<Table, SourceError> {
        let columns = self.column_names(table, exclude)?;
        if columns.is_empty() {
            return Err(SourceError::NoColumns {
                table: table.to_string(),
            });
        }

        let select = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {select} FROM {}", quote_ident(table));
        debug!("{}: {sql}", self.path.display());

        let arity = columns.len();
        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.err(e))?;
        let rows = stmt
            .query_map([], |row| {
                (0..arity)
                    .map(|i| row.get_ref(i).map(to_value))
                    .collect::<Result<Record, _>>()
            })
            .map_err(|e| self.err(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.err(e))?;

        debug!("{table}: loaded {} row(s) x {arity} column(s)", rows.len());
        Ok(Table {
            name: table.to_string(),
            columns,
            rows,
        })
    }

    fn err(&self, e: rusqlite::Error) -> SourceError {
        sqlite_err(&self.path, e)
    }
}

fn sqlite_err(path: &Path, e: rusqlite::Error) -> SourceError {
    SourceError::Sqlite {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(x) => Value::from(x),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}
