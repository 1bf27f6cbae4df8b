//! Command implementations behind the CLI
//!
//! Each command returns its result to `main`, which owns printing errors and
//! choosing the exit code.

mod activity;
mod lint;

pub use activity::{get_activity, list_activities, reconcile_run, ActivityRow};
pub use lint::{run_lint, LintOptions};

use jx_lint::{LintError, RenderError};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::{host_config_path, ConfigError, EffectiveConfig, REPO_CONFIG_PATH};
use crate::store::StoreError;

/// Errors surfaced by CLI commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lint(#[from] LintError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline run {path}: {source}")]
    RunParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("activity {0:?} not found")]
    NotFound(String),
}

/// Merge the config layers; an explicit `--config` replaces the repo file
pub fn load_config(
    config_path: Option<&Path>,
    cli_overrides: Value,
) -> Result<EffectiveConfig, CliError> {
    let host = host_config_path();
    let repo = config_path.unwrap_or_else(|| Path::new(REPO_CONFIG_PATH));
    if let Some(path) = config_path.filter(|p| !p.exists()) {
        return Err(CliError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        });
    }
    let overrides = match cli_overrides {
        Value::Object(ref map) if map.is_empty() => None,
        other => Some(other),
    };
    Ok(EffectiveConfig::build(host.as_deref(), Some(repo), overrides)?)
}

/// Set `value` at the dot-separated `path` of `target`, creating objects on the way
pub fn set_override(target: &mut Value, path: &str, value: Value) {
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            set_override(child, rest, value);
        }
    }
}
