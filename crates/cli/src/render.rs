//! Delta presentation: colored text for humans, JSON for scripts.

use std::io::{self, Write};

use crossterm::style::{StyledContent, Stylize};
use rowdiff_recon::{Conflict, Delta, DiffReport, DiffSummary, ReconError, Record};
use serde::Serialize;

// ============================================================================
// Text
// ============================================================================

/// Writes one block per delta, each followed by a blank line.
///
/// ```text
/// - ("S010", "width", 2.49, "GeV")      deleted row (red)
/// + ("S014", "mass", 125.2, "GeV")      inserted row (green)
/// < ("S009", "mass", 1776.86, "MeV")    update, old row
/// > ("S009", "mass", 1776.93, "MeV")    update, new row (changed fields bold)
/// ```
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn write_report(&self, w: &mut dyn Write, report: &DiffReport) -> io::Result<()> {
        for delta in &report.deltas {
            self.write_delta(w, delta)?;
            writeln!(w)?;
        }
        for conflict in &report.conflicts {
            self.write_conflict(w, conflict)?;
            writeln!(w)?;
        }
        Ok(())
    }

    pub fn write_delta(&self, w: &mut dyn Write, delta: &Delta) -> io::Result<()> {
        match delta {
            Delta::Insert { row } => {
                let line = format!("+ {row}");
                writeln!(w, "{}", self.paint(line, |s| s.green()))
            }
            Delta::Delete { row } => {
                let line = format!("- {row}");
                writeln!(w, "{}", self.paint(line, |s| s.red()))
            }
            Delta::Update { old, new } => {
                let changed = delta.changed_fields();
                writeln!(w, "< {}", self.fields(old, &changed))?;
                writeln!(w, "> {}", self.fields(new, &changed))
            }
        }
    }

    fn write_conflict(&self, w: &mut dyn Write, conflict: &Conflict) -> io::Result<()> {
        let line = format!("! {}", ReconError::from(conflict.clone()));
        writeln!(w, "{}", self.paint(line, |s| s.yellow()))
    }

    /// `(a, b, c)` with the positions in `changed` emphasised.
    fn fields(&self, record: &Record, changed: &[usize]) -> String {
        let parts: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let text = v.to_string();
                if changed.contains(&i) {
                    self.paint(text, |s| s.bold())
                } else {
                    text
                }
            })
            .collect();
        format!("({})", parts.join(", "))
    }

    fn paint(&self, text: String, style: impl FnOnce(String) -> StyledContent<String>) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text
        }
    }
}

/// One-line human summary, written to stderr by the caller.
pub fn summary_line(label: &str, s: &DiffSummary) -> String {
    let mut line = format!(
        "{label}: {} before, {} after: {} updated, {} deleted, {} inserted, {} unchanged",
        s.before_rows, s.after_rows, s.updated, s.deleted, s.inserted, s.unchanged
    );
    if s.conflicts > 0 {
        line.push_str(&format!(", {} conflict(s)", s.conflicts));
    }
    line
}

// ============================================================================
// JSON
// ============================================================================

/// Run context echoed into the `meta` block of JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: String,
    pub name: String,
    pub table: String,
    pub before: String,
    pub after: String,
    pub columns: Vec<String>,
    pub max_distance: usize,
    pub duplicates: &'static str,
    pub on_conflict: &'static str,
}

impl RunMeta {
    pub fn stamp() -> String {
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    meta: &'a RunMeta,
    summary: &'a DiffSummary,
    deltas: &'a [Delta],
    conflicts: &'a [Conflict],
}

pub fn write_json(w: &mut dyn Write, meta: &RunMeta, report: &DiffReport) -> io::Result<()> {
    let out = JsonOutput {
        meta,
        summary: &report.summary,
        deltas: &report.deltas,
        conflicts: &report.conflicts,
    };
    serde_json::to_writer_pretty(&mut *w, &out).map_err(io::Error::from)?;
    writeln!(w)
}
