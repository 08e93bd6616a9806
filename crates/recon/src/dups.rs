//! Near-duplicate detection within a single snapshot.
//!
//! Rows that sit within matching distance of each other inside one snapshot
//! are exactly the rows that make cross-snapshot matching ambiguous, so this
//! is the tool for diagnosing an `AmbiguousMatch`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::distance::distance_clipped;
use crate::error::ReconError;
use crate::model::{Record, Value};

/// Two rows of one snapshot within `max_distance` of each other.
/// `earlier < later` are indices into the scanned rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearDuplicate {
    pub later: usize,
    pub earlier: usize,
    pub distance: usize,
}

/// Every pair of rows within `max_distance`, ordered by `later` then `earlier`.
///
/// With `group_by`, only rows sharing the value in that column are compared.
/// The column still counts toward the distance.
pub fn find_near_duplicates(
    rows: &[Record],
    max_distance: usize,
    group_by: Option<usize>,
) -> Result<Vec<NearDuplicate>, ReconError> {
    let groups: Vec<Vec<usize>> = match group_by {
        None => vec![(0..rows.len()).collect()],
        Some(column) => group_rows(rows, column)?,
    };

    let mut found = Vec::new();
    for members in &groups {
        for (pos, &later) in members.iter().enumerate() {
            for &earlier in &members[..pos] {
                let d = distance_clipped(&rows[later], &rows[earlier], max_distance)?;
                if d <= max_distance {
                    found.push(NearDuplicate {
                        later,
                        earlier,
                        distance: d,
                    });
                }
            }
        }
    }

    found.sort_by_key(|p| (p.later, p.earlier));
    Ok(found)
}

fn group_rows(rows: &[Record], column: usize) -> Result<Vec<Vec<usize>>, ReconError> {
    let mut groups: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let key = row.get(column).ok_or(ReconError::ColumnOutOfRange {
            column,
            arity: row.arity(),
        })?;
        groups.entry(key).or_default().push(i);
    }
    Ok(groups.into_values().collect())
}
