use std::fmt;
use std::ops::Deref;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// One column value of a snapshot row.
///
/// Equality is structural and type-strict: `Integer(1) != Real(1.0)`, and two
/// `Null`s compare equal (a NULL cell in both snapshots is unchanged content).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Integer(i64),
    Real(OrderedFloat<f64>),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{n}"),
            // Debug keeps the fractional part, so 1.0 never reads as Integer 1.
            Value::Real(x) => write!(f, "{:?}", x.0),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Blob(bytes) => {
                write!(f, "x'")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                write!(f, "'")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Real(x) => serializer.serialize_f64(x.0),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(OrderedFloat(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Blob(bytes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A fixed-arity row, one value per retained column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Record(Vec<Value>);

impl Record {
    pub fn new(fields: Vec<Value>) -> Self {
        Self(fields)
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Record {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Record {
    fn from(fields: Vec<Value>) -> Self {
        Self(fields)
    }
}

impl FromIterator<Value> for Record {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

/// Build a [`Record`] from anything convertible into [`Value`].
///
/// ```
/// use rowdiff_recon::record;
/// let r = record![1, "a", 2.5];
/// assert_eq!(r.arity(), 3);
/// ```
#[macro_export]
macro_rules! record {
    ($($v:expr),* $(,)?) => {
        $crate::model::Record::new(vec![$($crate::model::Value::from($v)),*])
    };
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// One classified difference between the before and after snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delta {
    /// Present only in the after snapshot.
    Insert { row: Record },
    /// Present only in the before snapshot.
    Delete { row: Record },
    /// A before row and its matched after row, distinct but within threshold.
    Update { old: Record, new: Record },
}

impl Delta {
    /// Positions whose values differ between the old and new row of an update.
    /// Empty for inserts and deletes.
    pub fn changed_fields(&self) -> Vec<usize> {
        match self {
            Delta::Update { old, new } => old
                .iter()
                .zip(new.iter())
                .enumerate()
                .filter(|(_, (a, b))| a != b)
                .map(|(i, _)| i)
                .collect(),
            Delta::Insert { .. } | Delta::Delete { .. } => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// A match that could not be accepted. Fatal under `ConflictPolicy::Error`,
/// collected into the report under `ConflictPolicy::Report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// More than one candidate tied for the minimum distance.
    Ambiguous { needle: Record, candidates: Vec<Record> },
    /// `record`'s nearest match is `forward`, but `forward`'s nearest match
    /// is `reverse`.
    Asymmetric { record: Record, forward: Record, reverse: Record },
}

// ---------------------------------------------------------------------------
// Summary + Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub before_rows: usize,
    pub after_rows: usize,
    pub unchanged: usize,
    pub updated: usize,
    pub deleted: usize,
    pub inserted: usize,
    pub conflicts: usize,
}

impl DiffSummary {
    pub fn has_differences(&self) -> bool {
        self.updated + self.deleted + self.inserted > 0
    }
}

/// Everything one reconciliation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub summary: DiffSummary,
    pub deltas: Vec<Delta>,
    pub conflicts: Vec<Conflict>,
}
