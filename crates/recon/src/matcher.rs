use crate::config::DuplicatePolicy;
use crate::distance::distance_clipped;
use crate::error::ReconError;
use crate::model::{Record, Value};

/// Outcome of a nearest-neighbour lookup. Indices point into the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nearest {
    /// Exactly one candidate at the minimum distance.
    Match(usize),
    /// Pool empty, or nothing within `max_distance`.
    NoMatch,
    /// Several candidates tie for the minimum distance, in pool order.
    Ambiguous(Vec<usize>),
}

/// Find the pool entry closest to `needle`, treating identical candidates as
/// ambiguous.
pub fn find_nearest(
    needle: &[Value],
    pool: &[Record],
    max_distance: usize,
) -> Result<Nearest, ReconError> {
    find_nearest_with(needle, pool, max_distance, DuplicatePolicy::Strict)
}

/// Find the pool entry closest to `needle` under the given duplicate policy.
///
/// Candidates farther than `max_distance` are never considered, so a tie
/// beyond the threshold is `NoMatch`, not `Ambiguous`.
pub fn find_nearest_with(
    needle: &[Value],
    pool: &[Record],
    max_distance: usize,
    duplicates: DuplicatePolicy,
) -> Result<Nearest, ReconError> {
    let mut min: Option<usize> = None;
    let mut tied: Vec<usize> = Vec::new();

    for (i, candidate) in pool.iter().enumerate() {
        let d = distance_clipped(needle, candidate, max_distance)?;
        if d > max_distance {
            continue;
        }
        match min {
            Some(m) if d > m => {}
            Some(m) if d == m => tied.push(i),
            _ => {
                min = Some(d);
                tied.clear();
                tied.push(i);
            }
        }
    }

    Ok(match tied.len() {
        0 => Nearest::NoMatch,
        1 => Nearest::Match(tied[0]),
        _ if duplicates == DuplicatePolicy::Fifo && all_identical(pool, &tied) => {
            Nearest::Match(tied[0])
        }
        _ => Nearest::Ambiguous(tied),
    })
}

fn all_identical(pool: &[Record], indices: &[usize]) -> bool {
    let first = &pool[indices[0]];
    indices[1..].iter().all(|&i| pool[i] == *first)
}
