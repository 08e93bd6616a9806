//! Load both snapshots, reconcile, render, and pick the exit code.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crossterm::tty::IsTty;
use log::{debug, info};
use rowdiff_io::sqlite::Snapshot;
use rowdiff_io::{ensure_same_kind, load_snapshot, SourceError, Table};
use rowdiff_recon::{ConflictPolicy, DiffReport, DuplicatePolicy, MatchOptions, NoProgress, Progress, Reconciler};

use crate::exit_codes::{EXIT_CONFLICTS, EXIT_DIFFS};
use crate::progress::TermProgress;
use crate::render::{self, RunMeta, TextRenderer};
use crate::{CliError, ColorArg, OutFormat, OutputArgs};

/// Everything needed for one diff, after flags and config are merged.
#[derive(Debug, Clone)]
pub struct DiffJob {
    pub label: String,
    pub table: String,
    pub before: PathBuf,
    pub after: PathBuf,
    pub exclude: Vec<String>,
    pub options: MatchOptions,
}

pub fn execute(job: &DiffJob, output: &OutputArgs) -> Result<(), CliError> {
    ensure_same_kind(&job.before, &job.after).map_err(source_err)?;
    let before = load(&job.before, &job.table, &job.exclude)?;
    let after = load(&job.after, &job.table, &job.exclude)?;
    before.ensure_same_columns(&after).map_err(|e| {
        CliError::source(e.to_string())
            .with_hint("both snapshots must expose the same columns after --exclude")
    })?;
    info!(
        "{}: {} before row(s), {} after row(s), {} column(s): {}",
        job.table,
        before.len(),
        after.len(),
        before.columns.len(),
        before.columns.join(", ")
    );

    let reconciler = Reconciler::new(job.options.clone());
    let report = {
        let mut term = (!output.quiet)
            .then(|| TermProgress::for_stderr(format!("matching {}", job.table)))
            .flatten();
        let mut silent = NoProgress;
        let progress: &mut dyn Progress = match term.as_mut() {
            Some(t) => t,
            None => &mut silent,
        };
        let report = reconciler.run(&before.rows, &after.rows, progress);
        if let Some(t) = term.as_mut() {
            t.finish();
        }
        report.map_err(CliError::recon)?
    };

    write_output(job, &before, &report, output)?;

    if !output.quiet {
        eprintln!("{}", render::summary_line(&job.label, &report.summary));
    }

    exit_status(&report)
}

fn load(path: &Path, table: &str, exclude: &[String]) -> Result<Table, CliError> {
    debug!("loading {table} from {}", path.display());
    load_snapshot(path, table, exclude).map_err(source_err)
}

/// Map a row-source failure to a CLI error, listing known tables when the
/// requested one does not exist.
pub fn source_err(err: SourceError) -> CliError {
    let hint = match &err {
        SourceError::UnknownTable { path, .. } => Snapshot::open(path)
            .and_then(|s| s.table_names())
            .ok()
            .map(|names| format!("available tables: {}", names.join(", "))),
        SourceError::NoColumns { .. } => Some("drop an --exclude or pass --no-exclude".to_string()),
        SourceError::MixedKinds { .. } => {
            Some("export both snapshots the same way (both .csv or both SQLite)".to_string())
        }
        _ => None,
    };
    let cli = CliError::source(err.to_string());
    match hint {
        Some(h) => cli.with_hint(h),
        None => cli,
    }
}

fn write_output(
    job: &DiffJob,
    before: &Table,
    report: &DiffReport,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let write_err = |e: io::Error| CliError::source(format!("cannot write output: {e}"));

    let mut sink: Box<dyn Write> = match &output.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            CliError::source(format!("cannot create {}: {e}", path.display()))
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match output.out {
        OutFormat::Text => {
            let color = use_color(output.color, output.output.is_none());
            TextRenderer::new(color)
                .write_report(&mut sink, report)
                .map_err(write_err)?;
        }
        OutFormat::Json => {
            let meta = run_meta(job, before);
            render::write_json(&mut sink, &meta, report).map_err(write_err)?;
        }
    }
    sink.flush().map_err(write_err)?;

    if let Some(path) = &output.output {
        if !output.quiet {
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn run_meta(job: &DiffJob, before: &Table) -> RunMeta {
    RunMeta {
        tool: "rowdiff",
        version: env!("CARGO_PKG_VERSION"),
        generated_at: RunMeta::stamp(),
        name: job.label.clone(),
        table: job.table.clone(),
        before: job.before.display().to_string(),
        after: job.after.display().to_string(),
        columns: before.columns.clone(),
        max_distance: job.options.max_distance,
        duplicates: match job.options.duplicates {
            DuplicatePolicy::Strict => "strict",
            DuplicatePolicy::Fifo => "fifo",
        },
        on_conflict: match job.options.on_conflict {
            ConflictPolicy::Error => "error",
            ConflictPolicy::Report => "report",
        },
    }
}

/// Color only for a terminal stdout, and never when NO_COLOR is set.
fn use_color(choice: ColorArg, to_stdout: bool) -> bool {
    match choice {
        ColorArg::Always => true,
        ColorArg::Never => false,
        ColorArg::Auto => {
            to_stdout && io::stdout().is_tty() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}

/// Reported conflicts outrank plain differences.
fn exit_status(report: &DiffReport) -> Result<(), CliError> {
    if !report.conflicts.is_empty() {
        return Err(CliError {
            code: EXIT_CONFLICTS,
            message: format!("{} conflict(s) reported", report.conflicts.len()),
            hint: None,
        });
    }
    if report.summary.has_differences() {
        return Err(CliError::silent(EXIT_DIFFS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdiff_recon::{record, Conflict, DiffSummary};

    fn report(summary: DiffSummary, conflicts: Vec<Conflict>) -> DiffReport {
        DiffReport {
            summary,
            deltas: Vec::new(),
            conflicts,
        }
    }

    #[test]
    fn exit_status_ordering() {
        assert!(exit_status(&report(DiffSummary::default(), vec![])).is_ok());

        let diffs = DiffSummary {
            inserted: 1,
            ..DiffSummary::default()
        };
        assert_eq!(exit_status(&report(diffs.clone(), vec![])).unwrap_err().code, EXIT_DIFFS);

        let conflict = Conflict::Ambiguous {
            needle: record![1],
            candidates: vec![record![2], record![3]],
        };
        assert_eq!(
            exit_status(&report(diffs, vec![conflict])).unwrap_err().code,
            EXIT_CONFLICTS
        );
    }

    #[test]
    fn explicit_color_choices() {
        assert!(use_color(ColorArg::Always, false));
        assert!(!use_color(ColorArg::Never, true));
        assert!(!use_color(ColorArg::Auto, false));
    }
}
