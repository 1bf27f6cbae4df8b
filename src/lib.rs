//! jx-pipeline - pipeline activity reconciler and lighthouse config linter
//!
//! The reconciler folds observed pipeline runs into PipelineActivity
//! records kept in an activity store. The linter checks the trigger configs
//! and pipelines under a repository's `.lighthouse` directory.

pub mod commands;
pub mod config;
pub mod logging;
pub mod store;

pub use commands::CliError;
pub use config::{ConfigError, EffectiveConfig, Settings};
pub use store::{ActivityStore, FileActivityStore, StoreError};
