//! Single-line progress indicator on stderr.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::QueueableCommand;
use rowdiff_recon::Progress;

/// Redraws `label done/total (pct%)` in place whenever the percentage moves.
pub struct TermProgress {
    label: String,
    last_pct: Option<usize>,
    drawn: bool,
}

impl TermProgress {
    /// `None` when stderr is not a terminal.
    pub fn for_stderr(label: impl Into<String>) -> Option<Self> {
        io::stderr().is_tty().then(|| Self {
            label: label.into(),
            last_pct: None,
            drawn: false,
        })
    }

    /// Erase the progress line.
    pub fn finish(&mut self) {
        if self.drawn {
            let mut err = io::stderr().lock();
            let _ = err.queue(MoveToColumn(0)).and_then(|e| e.queue(Clear(ClearType::CurrentLine)));
            let _ = err.flush();
            self.drawn = false;
        }
    }

    fn draw(&mut self, done: usize, total: usize, pct: usize) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.queue(MoveToColumn(0))?
            .queue(Clear(ClearType::CurrentLine))?
            .queue(Print(format!("{} {done}/{total} ({pct}%)", self.label)))?;
        err.flush()
    }
}

impl Progress for TermProgress {
    fn advance(&mut self, done: usize, total: usize) {
        let pct = percent(done, total);
        if self.last_pct == Some(pct) {
            return;
        }
        self.last_pct = Some(pct);
        // Progress is cosmetic; a failed redraw must not abort the run.
        if self.draw(done, total, pct).is_ok() {
            self.drawn = true;
        }
    }
}

impl Drop for TermProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        done.min(total) * 100 / total
    }
}
