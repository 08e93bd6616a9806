//! `rowdiff dups` - near-duplicate rows within one snapshot.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use rowdiff_io::load_snapshot;
use rowdiff_recon::dups::{find_near_duplicates, NearDuplicate};
use rowdiff_recon::Record;
use serde::Serialize;

use crate::diff::source_err;
use crate::exit_codes::EXIT_DIFFS;
use crate::{CliError, OutFormat};

#[derive(Serialize)]
struct PairOut<'a> {
    later: usize,
    earlier: usize,
    distance: usize,
    rows: [&'a Record; 2],
}

pub fn cmd_dups(
    snapshot: PathBuf,
    table: String,
    max_dist: usize,
    exclude: Vec<String>,
    group_by: Option<String>,
    out: OutFormat,
) -> Result<(), CliError> {
    let loaded = load_snapshot(&snapshot, &table, &exclude).map_err(source_err)?;

    let group_col = match &group_by {
        Some(name) => Some(loaded.column_index(name).ok_or_else(|| {
            CliError::usage(format!("--group-by: no column {name} in {table}"))
                .with_hint(format!("columns: {}", loaded.columns.join(", ")))
        })?),
        None => None,
    };

    let pairs = find_near_duplicates(&loaded.rows, max_dist, group_col).map_err(CliError::recon)?;
    let mut stdout = BufWriter::new(io::stdout().lock());
    write_pairs(&mut stdout, &loaded.rows, &pairs, out)
        .map_err(|e| CliError::source(format!("cannot write output: {e}")))?;

    eprintln!(
        "{table}: {} row(s), {} near-duplicate pair(s) within distance {max_dist}",
        loaded.len(),
        pairs.len()
    );
    if pairs.is_empty() {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_DIFFS))
    }
}

fn write_pairs(
    w: &mut dyn Write,
    rows: &[Record],
    pairs: &[NearDuplicate],
    out: OutFormat,
) -> io::Result<()> {
    match out {
        OutFormat::Text => {
            for p in pairs {
                writeln!(w, "{}", rows[p.earlier])?;
                writeln!(w, "{}", rows[p.later])?;
                writeln!(w)?;
            }
        }
        OutFormat::Json => {
            let items: Vec<PairOut<'_>> = pairs
                .iter()
                .map(|p| PairOut {
                    later: p.later,
                    earlier: p.earlier,
                    distance: p.distance,
                    rows: [&rows[p.earlier], &rows[p.later]],
                })
                .collect();
            serde_json::to_writer_pretty(&mut *w, &items).map_err(io::Error::from)?;
            writeln!(w)?;
        }
    }
    w.flush()
}
