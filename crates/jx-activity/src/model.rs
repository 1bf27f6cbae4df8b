//! PipelineActivity record types
//!
//! The record mirrors the `jenkins.io/v1` PipelineActivity resource: object
//! metadata plus a spec holding the git coordinates, build number, rolled-up
//! status and the ordered list of steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::status::ActivityStatus;

/// Default API version for new records
pub const API_VERSION: &str = "jenkins.io/v1";

/// Default kind for new records
pub const KIND: &str = "PipelineActivity";

/// Name of the placeholder stage shown before any task reports status
pub const INITIALISING_STAGE: &str = "initialising";

/// Stage name that does not count as a real stage when merging
pub const RELEASE_STAGE: &str = "Release";

/// Object metadata for an activity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A pipeline activity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineActivity {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ActivitySpec,
}

impl PipelineActivity {
    /// Create an empty record with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            spec: ActivitySpec::default(),
        }
    }

    /// The generated name identifying this record
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Look up a label value, treating empty values as absent
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Spec of a pipeline activity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySpec {
    /// Pipeline identifier in the form `owner/repository/branch`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pipeline: String,

    /// Build number, unique per pipeline
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build: String,

    #[serde(default)]
    pub status: ActivityStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ActivityStep>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_owner: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_repository: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_branch: String,

    /// Trigger context, e.g. `pr` or `release`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    #[serde(default, rename = "baseSHA", skip_serializing_if = "String::is_empty")]
    pub base_sha: String,

    #[serde(default, rename = "lastCommitSHA", skip_serializing_if = "String::is_empty")]
    pub last_commit_sha: String,
}

/// Fields shared by every kind of step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreStep {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub status: ActivityStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<DateTime<Utc>>,
}

impl CoreStep {
    pub fn new(name: impl Into<String>, status: ActivityStatus) -> Self {
        Self {
            name: name.into(),
            status,
            ..Default::default()
        }
    }
}

/// A stage: one pipeline task and its container steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStep {
    #[serde(flatten)]
    pub core: CoreStep,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<CoreStep>,
}

/// A promotion to an environment, usually appended by an external tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoteStep {
    #[serde(flatten)]
    pub core: CoreStep,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
}

/// A preview environment deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewStep {
    #[serde(flatten)]
    pub core: CoreStep,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pull_request_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub application_url: String,
}

/// A step of an activity, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActivityStep {
    Stage(StageStep),
    Promote(PromoteStep),
    Preview(PreviewStep),
}

impl ActivityStep {
    /// Create a stage step with no sub-steps
    pub fn stage(name: impl Into<String>, status: ActivityStatus) -> Self {
        ActivityStep::Stage(StageStep {
            core: CoreStep::new(name, status),
            steps: Vec::new(),
        })
    }

    pub fn core(&self) -> &CoreStep {
        match self {
            ActivityStep::Stage(s) => &s.core,
            ActivityStep::Promote(p) => &p.core,
            ActivityStep::Preview(p) => &p.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut CoreStep {
        match self {
            ActivityStep::Stage(s) => &mut s.core,
            ActivityStep::Promote(p) => &mut p.core,
            ActivityStep::Preview(p) => &mut p.core,
        }
    }

    pub fn name(&self) -> &str {
        &self.core().name
    }

    pub fn status(&self) -> ActivityStatus {
        self.core().status
    }

    pub fn as_stage(&self) -> Option<&StageStep> {
        match self {
            ActivityStep::Stage(s) => Some(s),
            _ => None,
        }
    }

    /// Preview and Promote steps are created outside the pipeline run
    pub fn is_promotion(&self) -> bool {
        matches!(self, ActivityStep::Promote(_) | ActivityStep::Preview(_))
    }
}
