// CSV snapshot reader
//
// A CSV export carries no types, so every cell becomes `Value::Text`
// (an empty cell is `Text("")`, not NULL).

use std::io::Read;
use std::path::Path;

use log::debug;
use rowdiff_recon::{Record, Value};

use crate::error::SourceError;
use crate::table::Table;

/// Read a CSV file with a header row. `table` only names the result.
pub fn load_csv(path: &Path, table: &str, exclude: &[String]) -> Result<Table, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let loaded = read_csv(file, table, exclude).map_err(|e| match e {
        CsvError::NoColumns => SourceError::NoColumns {
            table: table.to_string(),
        },
        CsvError::Parse(e) => SourceError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    debug!(
        "{}: loaded {} row(s) x {} column(s)",
        path.display(),
        loaded.len(),
        loaded.columns.len()
    );
    Ok(loaded)
}

/// Parse CSV from any reader. Errors carry no path; `load_csv` adds it.
pub fn read_csv<R: Read>(reader: R, table: &str, exclude: &[String]) -> Result<Table, CsvError> {
    let mut rdr = ::csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers().map_err(CsvError::Parse)?.clone();
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !crate::is_excluded(name, exclude))
        .map(|(i, _)| i)
        .collect();
    if keep.is_empty() {
        return Err(CsvError::NoColumns);
    }
    let columns = keep.iter().map(|&i| headers[i].to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(CsvError::Parse)?;
        let row: Record = keep
            .iter()
            .map(|&i| Value::Text(record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }

    Ok(Table {
        name: table.to_string(),
        columns,
        rows,
    })
}

#[derive(Debug)]
pub enum CsvError {
    Parse(::csv::Error),
    NoColumns,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::NoColumns => write!(f, "every column is excluded"),
        }
    }
}

impl std::error::Error for CsvError {}
