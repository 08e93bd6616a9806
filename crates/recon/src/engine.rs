use crate::config::{ConflictPolicy, DuplicatePolicy, MatchOptions};
use crate::error::ReconError;
use crate::matcher::{find_nearest_with, Nearest};
use crate::model::{Conflict, Delta, DiffReport, Record};
use crate::summary::compute_summary;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Observer notified after each before-row is processed.
pub trait Progress {
    fn advance(&mut self, done: usize, total: usize);
}

/// Discards progress notifications.
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self, _done: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Reconcile `before` against `after` with default options, aborting on any
/// ambiguous or asymmetric match.
///
/// Deltas for before-rows come first in `before` order, followed by inserts
/// in `after` order. Unchanged rows produce nothing.
pub fn reconcile(
    before: &[Record],
    after: &[Record],
    max_distance: usize,
) -> Result<Vec<Delta>, ReconError> {
    let options = MatchOptions {
        max_distance,
        ..MatchOptions::default()
    };
    Reconciler::new(options)
        .run(before, after, &mut NoProgress)
        .map(|report| report.deltas)
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: MatchOptions,
}

impl Reconciler {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn run(
        &self,
        before: &[Record],
        after: &[Record],
        progress: &mut dyn Progress,
    ) -> Result<DiffReport, ReconError> {
        let mut pool = AfterPool::new(after);
        let mut deltas = Vec::new();
        let mut conflicts = Vec::new();

        for (i, row) in before.iter().enumerate() {
            match self.match_row(row, before, after)? {
                RowMatch::Unmatched => deltas.push(Delta::Delete { row: row.clone() }),
                RowMatch::Matched(index) => {
                    pool.take(index, self.options.duplicates)?;
                    let candidate = &after[index];
                    if candidate != row {
                        deltas.push(Delta::Update {
                            old: row.clone(),
                            new: candidate.clone(),
                        });
                    }
                }
                RowMatch::Conflict { conflict, claimed } => match self.options.on_conflict {
                    ConflictPolicy::Error => return Err(conflict.into()),
                    ConflictPolicy::Report => {
                        pool.claim(&claimed);
                        conflicts.push(conflict);
                    }
                },
            }
            progress.advance(i + 1, before.len());
        }

        deltas.extend(pool.remaining().map(|row| Delta::Insert { row: row.clone() }));

        let summary = compute_summary(before.len(), after.len(), &deltas, &conflicts);
        Ok(DiffReport {
            summary,
            deltas,
            conflicts,
        })
    }

    /// Forward lookup against the full after-collection, then the mutual
    /// nearest-neighbour check against the full before-collection.
    fn match_row(
        &self,
        row: &Record,
        before: &[Record],
        after: &[Record],
    ) -> Result<RowMatch, ReconError> {
        let max = self.options.max_distance;
        let dups = self.options.duplicates;

        let forward = match find_nearest_with(row, after, max, dups)? {
            Nearest::NoMatch => return Ok(RowMatch::Unmatched),
            Nearest::Ambiguous(indices) => {
                return Ok(RowMatch::Conflict {
                    conflict: Conflict::Ambiguous {
                        needle: row.clone(),
                        candidates: pick(after, &indices),
                    },
                    claimed: indices,
                });
            }
            Nearest::Match(index) => index,
        };

        let candidate = &after[forward];
        match find_nearest_with(candidate, before, max, dups)? {
            Nearest::Match(k) if before[k] == *row => Ok(RowMatch::Matched(forward)),
            Nearest::Match(k) => Ok(RowMatch::Conflict {
                conflict: Conflict::Asymmetric {
                    record: row.clone(),
                    forward: candidate.clone(),
                    reverse: before[k].clone(),
                },
                claimed: vec![forward],
            }),
            Nearest::Ambiguous(indices) => Ok(RowMatch::Conflict {
                conflict: Conflict::Ambiguous {
                    needle: candidate.clone(),
                    candidates: pick(before, &indices),
                },
                claimed: vec![forward],
            }),
            // `row` itself is within range of `candidate`.
            Nearest::NoMatch => unreachable!("distance is symmetric"),
        }
    }
}

enum RowMatch {
    Unmatched,
    Matched(usize),
    /// `claimed` are after-indices accounted for by the conflict.
    Conflict { conflict: Conflict, claimed: Vec<usize> },
}

fn pick(rows: &[Record], indices: &[usize]) -> Vec<Record> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}

// ---------------------------------------------------------------------------
// After-pool
// ---------------------------------------------------------------------------

/// Index-addressed multiset over the after-collection.
struct AfterPool<'a> {
    rows: &'a [Record],
    consumed: Vec<bool>,
    claimed: Vec<bool>,
}

impl<'a> AfterPool<'a> {
    fn new(rows: &'a [Record]) -> Self {
        Self {
            rows,
            consumed: vec![false; rows.len()],
            claimed: vec![false; rows.len()],
        }
    }

    /// Consume the matched row. Under `Fifo` the first unconsumed occurrence
    /// of an equal record is consumed instead of `index` itself.
    fn take(&mut self, index: usize, duplicates: DuplicatePolicy) -> Result<(), ReconError> {
        let slot = match duplicates {
            DuplicatePolicy::Strict => Some(index).filter(|&i| !self.consumed[i]),
            DuplicatePolicy::Fifo => {
                let wanted = &self.rows[index];
                (0..self.rows.len()).find(|&i| !self.consumed[i] && self.rows[i] == *wanted)
            }
        };

        match slot {
            Some(i) => {
                self.consumed[i] = true;
                Ok(())
            }
            None => Err(ReconError::DuplicateRemoval {
                record: self.rows[index].clone(),
            }),
        }
    }

    fn claim(&mut self, indices: &[usize]) {
        for &i in indices {
            self.claimed[i] = true;
        }
    }

    /// Rows neither consumed by a match nor claimed by a conflict, in order.
    fn remaining(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.consumed[*i] && !self.claimed[*i])
            .map(|(_, r)| r)
    }
}
