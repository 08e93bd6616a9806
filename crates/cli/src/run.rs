//! `rowdiff run` / `rowdiff validate` - config-driven diffs.

use std::path::{Path, PathBuf};

use log::debug;
use rowdiff_recon::DiffConfig;

use crate::diff::{self, DiffJob};
use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::{CliError, MatchArgs, OutputArgs};

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<DiffConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::source(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    DiffConfig::from_toml(&config_str).map_err(|e| config_err(e.to_string()))
}

/// Snapshot paths in a config are relative to the config file's directory.
fn resolve(config_path: &Path, snapshot: &Path) -> PathBuf {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    base_dir.join(snapshot)
}

/// Merge a config with command-line overrides.
fn job_from_config(config_path: &Path, config: &DiffConfig, matching: &MatchArgs) -> DiffJob {
    DiffJob {
        label: config.display_name().to_string(),
        table: config.table.clone(),
        before: resolve(config_path, &config.before.path),
        after: resolve(config_path, &config.after.path),
        exclude: matching.exclude_columns(config.exclude_columns.clone()),
        options: matching.apply(config.match_options()),
    }
}

pub fn cmd_run(config_path: PathBuf, matching: MatchArgs, output: OutputArgs) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let job = job_from_config(&config_path, &config, &matching);
    debug!("run {}: {job:?}", config_path.display());
    diff::execute(&job, &output)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    let mut missing = Vec::new();
    for snap in [&config.before, &config.after] {
        let path = resolve(&config_path, &snap.path);
        if !path.exists() {
            missing.push(path.display().to_string());
        }
    }

    eprintln!(
        "{}: table {}, max_distance {}, excluding [{}]",
        config.display_name(),
        config.table,
        config.max_distance,
        config.exclude_columns.join(", ")
    );
    if !missing.is_empty() {
        return Err(config_err(format!("snapshot not found: {}", missing.join(", ")))
            .with_hint("snapshot paths are relative to the config file's directory"));
    }
    eprintln!("config OK");
    Ok(())
}
