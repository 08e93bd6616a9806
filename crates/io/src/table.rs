use rowdiff_recon::Record;

use crate::error::SourceError;

/// One table read from a snapshot, after column exclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` among the retained columns (ASCII case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Both snapshots must expose the same retained columns in the same order,
    /// otherwise positional distance compares unrelated fields.
    pub fn ensure_same_columns(&self, after: &Table) -> Result<(), SourceError> {
        let same = self.columns.len() == after.columns.len()
            && self
                .columns
                .iter()
                .zip(&after.columns)
                .all(|(a, b)| a.eq_ignore_ascii_case(b));
        if same {
            Ok(())
        } else {
            Err(SourceError::ColumnMismatch {
                before: self.columns.clone(),
                after: after.columns.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdiff_recon::record;

    fn table(columns: &[&str]) -> Table {
        Table {
            name: "t".into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: vec![record![1, "a"]],
        }
    }

    #[test]
    fn same_columns_ignore_case() {
        assert!(table(&["pdgid", "value"]).ensure_same_columns(&table(&["PDGID", "Value"])).is_ok());
    }

    #[test]
    fn reordered_columns_mismatch() {
        let err = table(&["a", "b"]).ensure_same_columns(&table(&["b", "a"])).unwrap_err();
        assert!(matches!(err, SourceError::ColumnMismatch { .. }));
    }

    #[test]
    fn column_index_lookup() {
        let t = table(&["pdgid", "value"]);
        assert_eq!(t.column_index("VALUE"), Some(1));
        assert_eq!(t.column_index("missing"), None);
        assert_eq!(t.len(), 1);
    }
}
