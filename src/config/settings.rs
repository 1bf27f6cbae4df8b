//! Typed view of the merged configuration

use jx_activity::LabelKeys;
use jx_lint::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::DEFAULT_STORE_DIR;
use super::effective::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Label and annotation keys read from pipeline runs
    pub labels: LabelKeys,
    pub store: StoreSettings,
    pub lint: LintSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory holding one JSON file per activity
    pub dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintSettings {
    pub format: OutputFormat,
    pub recursive: bool,
}

impl Settings {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.store.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("store.dir must not be empty".to_string()));
        }
        let keys = &self.labels;
        let lists = [
            ("labels.owner", &keys.owner),
            ("labels.repository", &keys.repository),
            ("labels.branch", &keys.branch),
            ("labels.build", &keys.build),
        ];
        for (field, list) in lists {
            if list.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} must list at least one key",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let settings = Settings::default();
        assert_eq!(settings.store.dir, PathBuf::from(".jx/activities"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_identity_keys_rejected() {
        let mut settings = Settings::default();
        settings.labels.branch.clear();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("labels.branch"));
    }

    #[test]
    fn test_empty_store_dir_rejected() {
        let settings: Settings =
            serde_json::from_value(serde_json::json!({"store": {"dir": ""}})).unwrap();
        assert!(settings.validate().is_err());
    }
}
