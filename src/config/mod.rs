//! Layered configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/jx/pipeline.toml)
//! 3. Repo config (.jx/pipeline.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;
mod settings;

use std::path::PathBuf;

pub use defaults::{BuiltinDefaults, DEFAULT_STORE_DIR};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::{LintSettings, Settings, StoreSettings};

/// Repo config path, relative to the working directory
pub const REPO_CONFIG_PATH: &str = ".jx/pipeline.toml";

/// Host config path, when a home directory is known
pub fn host_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(".config/jx/pipeline.toml"))
}
