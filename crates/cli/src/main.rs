// rowdiff - fuzzy diffs between two snapshots of a table

mod diff;
mod dups;
mod exit_codes;
mod progress;
mod render;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rowdiff_recon::config::default_exclude_columns;
use rowdiff_recon::{ConflictPolicy, DuplicatePolicy, MatchOptions};

use exit_codes::{EXIT_SOURCE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rowdiff")]
#[command(about = "Fuzzy row-level diff between two snapshots of a database table")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff one table between two snapshots
    #[command(after_help = "\
Examples:
  rowdiff diff old.sqlite new.sqlite pdgdata
  rowdiff diff old.sqlite new.sqlite pdgdata --max-dist 2 --exclude id --exclude parent_id
  rowdiff diff old.csv new.csv pdgdata --out json --output diff.json

Exit codes:
  0  no differences      4  ambiguous match
  1  differences found   5  asymmetric match
  2  usage error         6  duplicate removal / arity mismatch
  3  source error        8  conflicts reported (--on-conflict report)")]
    Diff {
        /// Before snapshot (SQLite database, or .csv export)
        before: PathBuf,

        /// After snapshot (SQLite database, or .csv export)
        after: PathBuf,

        /// Table to compare
        table: String,

        #[command(flatten)]
        matching: MatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run a diff described by a TOML config file
    #[command(after_help = "\
Examples:
  rowdiff run nightly.rowdiff.toml
  rowdiff run nightly.rowdiff.toml --out json --output diff.json
  rowdiff run nightly.rowdiff.toml --max-dist 2")]
    Run {
        /// Path to the .rowdiff.toml config file
        config: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate a config file without running it
    Validate {
        /// Path to the .rowdiff.toml config file
        config: PathBuf,
    },

    /// List near-duplicate rows within one snapshot
    #[command(after_help = "\
Near-duplicates are what make `rowdiff diff` report ambiguous matches.

Examples:
  rowdiff dups new.sqlite pdgdata
  rowdiff dups new.sqlite pdgdata --group-by pdgid --max-dist 2")]
    Dups {
        /// Snapshot (SQLite database, or .csv export)
        snapshot: PathBuf,

        /// Table to scan
        table: String,

        /// Maximum number of differing fields for a pair to be reported
        #[arg(long = "max-dist", value_name = "N", default_value_t = rowdiff_recon::config::DEFAULT_MAX_DISTANCE)]
        max_dist: usize,

        /// Column to drop before comparing (repeatable; replaces the default `id`)
        #[arg(long, value_name = "COL")]
        exclude: Vec<String>,

        /// Keep every column, including `id`
        #[arg(long, conflicts_with = "exclude")]
        no_exclude: bool,

        /// Only compare rows sharing the value of this column
        #[arg(long, value_name = "COL")]
        group_by: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        out: OutFormat,
    },
}

// ============================================================================
// Shared arguments
// ============================================================================

/// Matching knobs. Every field is optional so config values can show through.
#[derive(Args, Debug, Default)]
struct MatchArgs {
    /// Maximum number of differing fields for two rows to count as one updated row [default: 1]
    #[arg(long = "max-dist", value_name = "N")]
    max_dist: Option<usize>,

    /// Column to drop before comparing (repeatable; replaces the default `id`)
    #[arg(long, value_name = "COL")]
    exclude: Vec<String>,

    /// Keep every column, including `id`
    #[arg(long, conflicts_with = "exclude")]
    no_exclude: bool,

    /// How identical candidate rows are treated [default: strict]
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatesArg>,

    /// Abort on ambiguous/asymmetric matches, or report them and continue [default: error]
    #[arg(long, value_enum)]
    on_conflict: Option<OnConflictArg>,
}

impl MatchArgs {
    fn exclude_columns(&self, base: Vec<String>) -> Vec<String> {
        if self.no_exclude {
            Vec::new()
        } else if !self.exclude.is_empty() {
            self.exclude.clone()
        } else {
            base
        }
    }

    fn apply(&self, base: MatchOptions) -> MatchOptions {
        MatchOptions {
            max_distance: self.max_dist.unwrap_or(base.max_distance),
            duplicates: self.duplicates.map(Into::into).unwrap_or(base.duplicates),
            on_conflict: self.on_conflict.map(Into::into).unwrap_or(base.on_conflict),
        }
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    out: OutFormat,

    /// Write output to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// When to color text output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorArg,

    /// No summary or progress on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DuplicatesArg {
    /// Identical candidates tie and are ambiguous
    Strict,
    /// Identical candidates are matched first-come, first-served
    Fifo,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::Strict => DuplicatePolicy::Strict,
            DuplicatesArg::Fifo => DuplicatePolicy::Fifo,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnConflictArg {
    Error,
    Report,
}

impl From<OnConflictArg> for ConflictPolicy {
    fn from(arg: OnConflictArg) -> Self {
        match arg {
            OnConflictArg::Error => ConflictPolicy::Error,
            OnConflictArg::Report => ConflictPolicy::Report,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  rowdiff-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Diff {
            before,
            after,
            table,
            matching,
            output,
        } => cmd_diff(before, after, table, matching, output),
        Commands::Run {
            config,
            matching,
            output,
        } => run::cmd_run(config, matching, output),
        Commands::Validate { config } => run::cmd_validate(config),
        Commands::Dups {
            snapshot,
            table,
            max_dist,
            exclude,
            no_exclude,
            group_by,
            out,
        } => {
            let exclude = MatchArgs {
                exclude,
                no_exclude,
                ..MatchArgs::default()
            }
            .exclude_columns(default_exclude_columns());
            dups::cmd_dups(snapshot, table, max_dist, exclude, group_by, out)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_diff(
    before: PathBuf,
    after: PathBuf,
    table: String,
    matching: MatchArgs,
    output: OutputArgs,
) -> Result<(), CliError> {
    let job = diff::DiffJob {
        label: table.clone(),
        exclude: matching.exclude_columns(default_exclude_columns()),
        options: matching.apply(MatchOptions::default()),
        table,
        before,
        after,
    };
    diff::execute(&job, &output)
}

// ============================================================================
// Errors
// ============================================================================

/// A failed command: exit code, message for stderr, optional hint.
/// An empty message prints nothing (used for "differences found").
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self { code: EXIT_SOURCE, message: msg.into(), hint: None }
    }

    /// Exit with `code` and print nothing.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    pub fn recon(err: rowdiff_recon::ReconError) -> Self {
        let code = exit_codes::recon_exit_code(&err);
        let hint = match &err {
            rowdiff_recon::ReconError::AmbiguousMatch { .. } => Some(
                "use --duplicates fifo for identical rows, --on-conflict report to continue, \
                 or `rowdiff dups` to inspect near-duplicates"
                    .to_string(),
            ),
            rowdiff_recon::ReconError::AsymmetricMatch { .. } => {
                Some("try a smaller --max-dist, or --on-conflict report to continue".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exclude_flags_override_default() {
        let defaults = default_exclude_columns();

        let none = MatchArgs::default();
        assert_eq!(none.exclude_columns(defaults.clone()), vec!["id"]);

        let custom = MatchArgs {
            exclude: vec!["id".into(), "parent_id".into()],
            ..MatchArgs::default()
        };
        assert_eq!(custom.exclude_columns(defaults.clone()), vec!["id", "parent_id"]);

        let keep_all = MatchArgs {
            no_exclude: true,
            ..MatchArgs::default()
        };
        assert!(keep_all.exclude_columns(defaults).is_empty());
    }

    #[test]
    fn flags_override_config_options() {
        let base = MatchOptions {
            max_distance: 3,
            duplicates: DuplicatePolicy::Fifo,
            on_conflict: ConflictPolicy::Report,
        };
        assert_eq!(MatchArgs::default().apply(base.clone()), base);

        let args = MatchArgs {
            max_dist: Some(0),
            on_conflict: Some(OnConflictArg::Error),
            ..MatchArgs::default()
        };
        let merged = args.apply(base);
        assert_eq!(merged.max_distance, 0);
        assert_eq!(merged.duplicates, DuplicatePolicy::Fifo);
        assert_eq!(merged.on_conflict, ConflictPolicy::Error);
    }

    #[test]
    fn parses_diff_invocation() {
        let cli = Cli::try_parse_from([
            "rowdiff", "diff", "a.sqlite", "b.sqlite", "pdgdata", "--max-dist", "2",
            "--exclude", "id", "--exclude", "parent_id", "--duplicates", "fifo", "--out", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff { table, matching, output, .. } => {
                assert_eq!(table, "pdgdata");
                assert_eq!(matching.max_dist, Some(2));
                assert_eq!(matching.exclude, vec!["id", "parent_id"]);
                assert_eq!(matching.duplicates, Some(DuplicatesArg::Fifo));
                assert_eq!(output.out, OutFormat::Json);
            }
            _ => panic!("expected diff"),
        }
    }

    #[test]
    fn exclude_and_no_exclude_conflict() {
        let res = Cli::try_parse_from([
            "rowdiff", "diff", "a", "b", "t", "--exclude", "id", "--no-exclude",
        ]);
        assert!(res.is_err());
    }
}
