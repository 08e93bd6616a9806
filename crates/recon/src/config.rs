use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Matching options
// ---------------------------------------------------------------------------

/// How identical records inside a candidate pool are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Identical candidates tie like any other candidates: ambiguous.
    #[default]
    Strict,
    /// Identical candidates collapse to their first occurrence; matched
    /// after-rows are consumed first-unconsumed-first.
    Fifo,
}

/// What to do with ambiguous or asymmetric matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort the run on the first conflict.
    #[default]
    Error,
    /// Record conflicts in the report and keep going.
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub max_distance: usize,
    pub duplicates: DuplicatePolicy,
    pub on_conflict: ConflictPolicy,
}

pub const DEFAULT_MAX_DISTANCE: usize = 1;

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            duplicates: DuplicatePolicy::default(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run config (TOML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub table: String,
    #[serde(default = "default_max_distance")]
    pub max_distance: usize,
    #[serde(default = "default_exclude_columns")]
    pub exclude_columns: Vec<String>,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
    pub before: SnapshotConfig,
    pub after: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Snapshot file, relative to the config file's directory.
    pub path: PathBuf,
}

fn default_max_distance() -> usize {
    DEFAULT_MAX_DISTANCE
}

/// Surrogate row ids differ between snapshots, so they are dropped by default.
pub fn default_exclude_columns() -> Vec<String> {
    vec!["id".to_string()]
}

impl DiffConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: DiffConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.table.trim().is_empty() {
            return Err(ReconError::ConfigValidation("table must not be empty".into()));
        }

        for (side, snap) in [("before", &self.before), ("after", &self.after)] {
            if snap.path.as_os_str().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{side}.path must not be empty"
                )));
            }
        }

        if let Some(col) = self.exclude_columns.iter().find(|c| c.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(format!(
                "exclude_columns contains an empty column name: {col:?}"
            )));
        }

        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            max_distance: self.max_distance,
            duplicates: self.duplicates,
            on_conflict: self.on_conflict,
        }
    }

    /// Display name: explicit `name`, else the table name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
