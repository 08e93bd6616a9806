//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `rowdiff` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success, snapshots have no differences               |
//! | 1    | Differences found (like `diff(1)`)                   |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Source error (missing file, unknown table, columns)  |
//! | 4    | Ambiguous match                                      |
//! | 5    | Asymmetric match                                     |
//! | 6    | Duplicate removal failure or arity mismatch          |
//! | 7    | Invalid run config                                   |
//! | 8    | Conflicts reported (`--on-conflict report`)          |
//!
//! A run that finds both differences and reported conflicts exits 8.

use rowdiff_recon::ReconError;

/// Success - no differences.
pub const EXIT_SUCCESS: u8 = 0;

/// Differences found.
pub const EXIT_DIFFS: u8 = 1;

/// Usage error - bad arguments, invalid flag combination.
pub const EXIT_USAGE: u8 = 2;

/// Row source error - unreadable file, unknown table, column mismatch,
/// output write failure.
pub const EXIT_SOURCE: u8 = 3;

/// A row had several equally near candidates.
pub const EXIT_AMBIGUOUS: u8 = 4;

/// Nearest-neighbour match was not mutual.
pub const EXIT_ASYMMETRIC: u8 = 5;

/// Matched row could not be removed from the pool, or records of
/// different arity were compared.
pub const EXIT_DUPLICATE: u8 = 6;

/// Run config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 7;

/// Report mode collected at least one conflict.
pub const EXIT_CONFLICTS: u8 = 8;

/// Exit code for an engine error.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::AmbiguousMatch { .. } => EXIT_AMBIGUOUS,
        ReconError::AsymmetricMatch { .. } => EXIT_ASYMMETRIC,
        ReconError::DuplicateRemoval { .. } | ReconError::ArityMismatch { .. } => EXIT_DUPLICATE,
        ReconError::ColumnOutOfRange { .. } => EXIT_USAGE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    }
}
