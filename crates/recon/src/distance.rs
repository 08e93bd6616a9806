use crate::error::ReconError;
use crate::model::Value;

/// Number of positions at which two same-arity records differ.
///
/// Every differing field counts 1 no matter how far apart the values are.
pub fn distance(a: &[Value], b: &[Value]) -> Result<usize, ReconError> {
    check_arity(a, b)?;
    Ok(a.iter().zip(b).filter(|(x, y)| x != y).count())
}

/// Like [`distance`], but stops counting once the result exceeds `max`.
///
/// Any result `<= max` is exact; anything larger is reported as `max + 1`.
pub fn distance_clipped(a: &[Value], b: &[Value], max: usize) -> Result<usize, ReconError> {
    check_arity(a, b)?;
    let mut d = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            d += 1;
            if d > max {
                break;
            }
        }
    }
    Ok(d)
}

fn check_arity(a: &[Value], b: &[Value]) -> Result<(), ReconError> {
    if a.len() != b.len() {
        return Err(ReconError::ArityMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn counts_differing_fields() {
        let a = record![1, "a", "x"];
        let b = record![1, "b", "y"];
        assert_eq!(distance(&a, &b).unwrap(), 2);
        assert_eq!(distance(&b, &a).unwrap(), 2);
        assert_eq!(distance(&a, &a).unwrap(), 0);
    }

    #[test]
    fn magnitude_of_change_is_ignored() {
        let a = record![1, 100.0];
        assert_eq!(distance(&a, &record![1, 100.5]).unwrap(), 1);
        assert_eq!(distance(&a, &record![1, "something else"]).unwrap(), 1);
    }

    #[test]
    fn empty_records_are_equal() {
        assert_eq!(distance(&record![], &record![]).unwrap(), 0);
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let err = distance(&record![1, 2], &record![1]).unwrap_err();
        assert_eq!(err, ReconError::ArityMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn clipped_stops_after_max() {
        let a = record![1, 2, 3, 4, 5];
        let b = record![9, 9, 9, 9, 9];
        assert_eq!(distance_clipped(&a, &b, 1).unwrap(), 2);
        assert_eq!(distance_clipped(&a, &b, 10).unwrap(), 5);
        assert_eq!(distance_clipped(&a, &record![1, 2, 3, 4, 9], 1).unwrap(), 1);
    }

    #[test]
    fn clipped_checks_arity() {
        assert!(distance_clipped(&record![1], &record![], 0).is_err());
    }
}
