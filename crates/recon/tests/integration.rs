use std::path::PathBuf;

use rowdiff_recon::config::DiffConfig;
use rowdiff_recon::engine::{reconcile, NoProgress, Reconciler};
use rowdiff_recon::model::{Conflict, Delta};
use rowdiff_recon::{record, ConflictPolicy, DuplicatePolicy, MatchOptions, ReconError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn pure_insert() {
    let before = vec![record![1, "a"]];
    let after = vec![record![1, "a"], record![2, "b"]];
    let deltas = reconcile(&before, &after, 1).unwrap();
    assert_eq!(deltas, vec![Delta::Insert { row: record![2, "b"] }]);
}

#[test]
fn pure_delete() {
    let before = vec![record![1, "a"], record![2, "b"]];
    let after = vec![record![1, "a"]];
    let deltas = reconcile(&before, &after, 1).unwrap();
    assert_eq!(deltas, vec![Delta::Delete { row: record![2, "b"] }]);
}

#[test]
fn single_field_update_within_threshold() {
    let before = vec![record![1, "a", "x"]];
    let after = vec![record![1, "a", "y"]];
    let deltas = reconcile(&before, &after, 1).unwrap();
    assert_eq!(
        deltas,
        vec![Delta::Update {
            old: record![1, "a", "x"],
            new: record![1, "a", "y"],
        }]
    );
    assert_eq!(deltas[0].changed_fields(), vec![2]);
}

#[test]
fn beyond_threshold_is_delete_plus_insert() {
    let before = vec![record![1, "a", "x"]];
    let after = vec![record![2, "b", "y"]];
    let deltas = reconcile(&before, &after, 1).unwrap();
    assert_eq!(
        deltas,
        vec![
            Delta::Delete { row: record![1, "a", "x"] },
            Delta::Insert { row: record![2, "b", "y"] },
        ]
    );
}

#[test]
fn ambiguous_match_names_every_candidate() {
    let before = vec![record![1, "a"]];
    let after = vec![record![1, "b"], record![1, "c"]];
    let err = reconcile(&before, &after, 1).unwrap_err();
    assert_eq!(
        err,
        ReconError::AmbiguousMatch {
            needle: record![1, "a"],
            candidates: vec![record![1, "b"], record![1, "c"]],
        }
    );
}

#[test]
fn mixed_snapshot_keeps_before_order_then_inserts() {
    let before = vec![
        record!["S008", "mass", 105.66, "MeV"],
        record!["S009", "mass", 1776.86, "MeV"],
        record!["S010", "width", 2.49, "GeV"],
        record!["S011", "mass", 80.37, "GeV"],
    ];
    let after = vec![
        record!["S011", "mass", 80.37, "GeV"],
        record!["S009", "mass", 1776.93, "MeV"],
        record!["S014", "mass", 125.2, "GeV"],
        record!["S008", "mass", 105.66, "MeV"],
    ];

    let deltas = reconcile(&before, &after, 1).unwrap();
    assert_eq!(
        deltas,
        vec![
            Delta::Update {
                old: record!["S009", "mass", 1776.86, "MeV"],
                new: record!["S009", "mass", 1776.93, "MeV"],
            },
            Delta::Delete { row: record!["S010", "width", 2.49, "GeV"] },
            Delta::Insert { row: record!["S014", "mass", 125.2, "GeV"] },
        ]
    );
}

#[test]
fn zero_threshold_is_exact_set_difference() {
    let before = vec![record![1, "a"], record![2, "b"]];
    let after = vec![record![1, "a"], record![2, "c"]];
    let deltas = reconcile(&before, &after, 0).unwrap();
    assert_eq!(
        deltas,
        vec![
            Delta::Delete { row: record![2, "b"] },
            Delta::Insert { row: record![2, "c"] },
        ]
    );
}

#[test]
fn report_mode_summarises_conflicts() {
    let before = vec![record![1, "a"], record![2, "x"]];
    let after = vec![record![1, "b"], record![1, "c"], record![2, "y"]];
    let options = MatchOptions {
        max_distance: 1,
        duplicates: DuplicatePolicy::Strict,
        on_conflict: ConflictPolicy::Report,
    };
    let report = Reconciler::new(options)
        .run(&before, &after, &mut NoProgress)
        .unwrap();

    assert!(matches!(report.conflicts[0], Conflict::Ambiguous { .. }));
    assert_eq!(report.summary.conflicts, 1);
    assert_eq!(report.summary.updated, 1);
    assert_eq!(report.summary.inserted, 0);
    assert_eq!(report.summary.unchanged, 0);
    assert!(report.summary.has_differences());
}

#[test]
fn report_serializes_to_json() {
    let before = vec![record![1, "a", "x"]];
    let after = vec![record![1, "a", "y"], record![2, "b", "z"]];
    let report = Reconciler::default()
        .run(&before, &after, &mut NoProgress)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["updated"], 1);
    assert_eq!(json["summary"]["inserted"], 1);
    assert_eq!(json["deltas"][0]["kind"], "update");
    assert_eq!(json["deltas"][1]["kind"], "insert");
    assert_eq!(json["deltas"][1]["row"], serde_json::json!([2, "b", "z"]));
    assert_eq!(json["conflicts"], serde_json::json!([]));
}

// -------------------------------------------------------------------------
// Config
// -------------------------------------------------------------------------

#[test]
fn fixture_config_parses() {
    let toml = std::fs::read_to_string(fixtures_dir().join("nightly.rowdiff.toml")).unwrap();
    let config = DiffConfig::from_toml(&toml).unwrap();

    assert_eq!(config.display_name(), "pdg nightly");
    assert_eq!(config.table, "pdgdata");
    assert_eq!(config.exclude_columns, vec!["id", "parent_id"]);
    let opts = config.match_options();
    assert_eq!(opts.max_distance, 2);
    assert_eq!(opts.duplicates, DuplicatePolicy::Fifo);
    assert_eq!(opts.on_conflict, ConflictPolicy::Error);
}
