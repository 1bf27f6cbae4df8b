//! Persistence of activity records
//!
//! `FileActivityStore` keeps one pretty-printed JSON file per record,
//! `<dir>/<name>.json`, replaced atomically on every upsert.

use jx_activity::PipelineActivity;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error in {path}: {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid activity name {0:?}")]
    InvalidName(String),
}

/// Keyed storage of activity records
pub trait ActivityStore {
    /// All records, sorted by name
    fn list(&self) -> Result<Vec<PipelineActivity>, StoreError>;

    fn get(&self, name: &str) -> Result<Option<PipelineActivity>, StoreError>;

    /// Create or replace the record stored under `name`
    fn upsert(&self, name: &str, activity: &PipelineActivity) -> Result<(), StoreError>;
}

/// Directory of JSON files
#[derive(Debug, Clone)]
pub struct FileActivityStore {
    dir: PathBuf,
}

impl FileActivityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    fn read(path: &Path) -> Result<PipelineActivity, StoreError> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|source| StoreError::JsonError {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ActivityStore for FileActivityStore {
    fn list(&self) -> Result<Vec<PipelineActivity>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut activities = paths
            .iter()
            .map(|p| Self::read(p))
            .collect::<Result<Vec<_>, _>>()?;
        activities.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(activities)
    }

    fn get(&self, name: &str) -> Result<Option<PipelineActivity>, StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn upsert(&self, name: &str, activity: &PipelineActivity) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(activity).map_err(|source| StoreError::JsonError {
            path: path.clone(),
            source,
        })?;

        // Write to temp file first, then rename over the record
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(activity = %name, path = %path.display(), "stored activity");
        Ok(())
    }
}
