//! Observed pipeline run snapshots
//!
//! A snapshot is what the reconciler sees of a running pipeline: its labels
//! and annotations plus the per-task execution status reported so far. Any
//! part of the status may be missing while the run is still starting up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSnapshot {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// Task statuses in pipeline order
    #[serde(default)]
    pub task_runs: Vec<TaskRunSnapshot>,
}

/// Status of one pipeline task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSnapshot {
    /// Name of the task within the pipeline, e.g. `from-build-pack`
    pub pipeline_task_name: String,

    /// Absent until the task run has been scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskRunStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pod_name: String,

    #[serde(default)]
    pub steps: Vec<StepSnapshot>,
}

/// Container state of one step, at most one of the states is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<StepWaiting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<StepRunning>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<StepTerminated>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepWaiting {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRunning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTerminated {
    #[serde(default)]
    pub exit_code: i32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepSnapshot {
    /// A step that exited at `finished_at`
    pub fn terminated(
        name: impl Into<String>,
        exit_code: i32,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            terminated: Some(StepTerminated {
                exit_code,
                started_at,
                finished_at,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// A step whose container is running
    pub fn running(name: impl Into<String>, started_at: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            running: Some(StepRunning { started_at }),
            ..Default::default()
        }
    }

    /// A step that has not started yet
    pub fn waiting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waiting: Some(StepWaiting::default()),
            ..Default::default()
        }
    }
}

impl TaskRunSnapshot {
    pub fn new(pipeline_task_name: impl Into<String>, pod_name: &str, steps: Vec<StepSnapshot>) -> Self {
        Self {
            pipeline_task_name: pipeline_task_name.into(),
            status: Some(TaskRunStatus {
                pod_name: pod_name.to_string(),
                steps,
            }),
        }
    }
}

impl PipelineRunSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// First non-empty pod name reported by any task
    pub fn pod_name(&self) -> Option<&str> {
        self.task_runs
            .iter()
            .filter_map(|t| t.status.as_ref())
            .map(|s| s.pod_name.as_str())
            .find(|p| !p.is_empty())
    }
}
