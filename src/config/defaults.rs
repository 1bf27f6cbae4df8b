//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Default directory of the file activity store, relative to the repo root
pub const DEFAULT_STORE_DIR: &str = ".jx/activities";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Activity store directory (default: ".jx/activities")
    pub store_dir: String,

    /// Lint report format (default: "text")
    pub lint_format: String,

    /// Walk nested `.lighthouse` dirs (default: false)
    pub lint_recursive: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            store_dir: DEFAULT_STORE_DIR.to_string(),
            lint_format: "text".to_string(),
            lint_recursive: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// Label keys are left out; unset keys fall back to `LabelKeys::default`
    /// when the merged value is deserialized.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "store": {
                "dir": self.store_dir
            },
            "lint": {
                "format": self.lint_format,
                "recursive": self.lint_recursive
            }
        })
    }
}
