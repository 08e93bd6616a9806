use std::fmt;

use crate::model::{Conflict, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Two compared records have different field counts.
    ArityMismatch { expected: usize, found: usize },
    /// More than one candidate ties for the minimum distance.
    AmbiguousMatch { needle: Record, candidates: Vec<Record> },
    /// The best match for `record` does not reciprocate.
    AsymmetricMatch { record: Record, forward: Record, reverse: Record },
    /// Every occurrence of a matched after-row has already been consumed.
    DuplicateRemoval { record: Record },
    /// A column index lies outside the record arity.
    ColumnOutOfRange { column: usize, arity: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error.
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch { expected, found } => {
                write!(f, "arity mismatch: record has {found} field(s), expected {expected}")
            }
            Self::AmbiguousMatch { needle, candidates } => {
                write!(f, "ambiguous match: {needle} --> ")?;
                write_records(f, candidates)
            }
            Self::AsymmetricMatch { record, forward, reverse } => {
                write!(f, "asymmetric match: {record} -> {forward} <- {reverse}")
            }
            Self::DuplicateRemoval { record } => write!(
                f,
                "duplicate removal: every occurrence of {record} in the after snapshot is already matched"
            ),
            Self::ColumnOutOfRange { column, arity } => {
                write!(f, "column {column} out of range for records with {arity} field(s)")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<Conflict> for ReconError {
    fn from(conflict: Conflict) -> Self {
        match conflict {
            Conflict::Ambiguous { needle, candidates } => Self::AmbiguousMatch { needle, candidates },
            Conflict::Asymmetric { record, forward, reverse } => {
                Self::AsymmetricMatch { record, forward, reverse }
            }
        }
    }
}

fn write_records(f: &mut fmt::Formatter<'_>, records: &[Record]) -> fmt::Result {
    write!(f, "[")?;
    for (i, r) in records.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{r}")?;
    }
    write!(f, "]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn ambiguous_message_lists_every_candidate() {
        let err = ReconError::AmbiguousMatch {
            needle: record![1, "a"],
            candidates: vec![record![1, "b"], record![1, "c"]],
        };
        assert_eq!(
            err.to_string(),
            r#"ambiguous match: (1, "a") --> [(1, "b"), (1, "c")]"#
        );
    }

    #[test]
    fn conflict_converts_to_matching_error() {
        let c = Conflict::Asymmetric {
            record: record![1],
            forward: record![2],
            reverse: record![3],
        };
        let err = ReconError::from(c);
        assert_eq!(err.to_string(), "asymmetric match: (1) -> (2) <- (3)");
    }
}
