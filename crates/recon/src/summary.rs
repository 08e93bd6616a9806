use crate::model::{Conflict, Delta, DiffSummary};

/// Compute summary counts for one run.
///
/// Every before-row is exactly one of: updated, deleted, in conflict, or
/// unchanged, so `unchanged` is what remains.
pub fn compute_summary(
    before_rows: usize,
    after_rows: usize,
    deltas: &[Delta],
    conflicts: &[Conflict],
) -> DiffSummary {
    let mut updated = 0;
    let mut deleted = 0;
    let mut inserted = 0;

    for d in deltas {
        match d {
            Delta::Update { .. } => updated += 1,
            Delta::Delete { .. } => deleted += 1,
            Delta::Insert { .. } => inserted += 1,
        }
    }

    DiffSummary {
        before_rows,
        after_rows,
        unchanged: before_rows.saturating_sub(updated + deleted + conflicts.len()),
        updated,
        deleted,
        inserted,
        conflicts: conflicts.len(),
    }
}
