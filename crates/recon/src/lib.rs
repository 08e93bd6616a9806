//! `rowdiff-recon`: fuzzy row reconciliation engine.
//!
//! Pure engine crate: receives two pre-loaded row collections, returns
//! classified differences. No CLI or IO dependencies.

pub mod config;
pub mod distance;
pub mod dups;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod summary;

pub use config::{ConflictPolicy, DiffConfig, DuplicatePolicy, MatchOptions};
pub use distance::distance;
pub use engine::{reconcile, NoProgress, Progress, Reconciler};
pub use error::ReconError;
pub use matcher::{find_nearest, Nearest};
pub use model::{Conflict, Delta, DiffReport, DiffSummary, Record, Value};
