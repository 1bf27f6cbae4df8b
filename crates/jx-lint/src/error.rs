//! Linter error types

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single schema violation with the field paths it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub paths: Vec<String>,
}

impl FieldError {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            paths: vec![path.into()],
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.paths.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.message, self.paths.join(", "))
        }
    }
}

/// All violations found in one definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok` when nothing was reported
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Errors raised while turning a pipeline file into a run definition
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported kind {0:?}, expected PipelineRun, Pipeline, Task or TaskRun")]
    UnsupportedKind(String),

    #[error("{kind} has no inline spec")]
    MissingSpec { kind: String },

    #[error("pipelineRef {0:?} is not supported, in-repo pipelines must use an inline pipelineSpec")]
    PipelineRef(String),

    #[error("include cycle detected at {0}")]
    IncludeCycle(PathBuf),

    #[error("step {step:?} not found in {path}")]
    IncludedStepNotFound { step: String, path: PathBuf },
}

/// Errors recorded against a linted file
#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to read dir {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to load file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("empty file {0}")]
    Empty(PathBuf),

    #[error("failed to parse YAML file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to unmarshal YAML file {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("failed to validate YAML file {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: FieldErrors,
    },

    #[error("invalid trigger config {path}: {}", .problems.join("; "))]
    Trigger { path: PathBuf, problems: Vec<String> },
}

/// Errors raised while rendering a lint report
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML report: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
