//! Pipeline run definitions
//!
//! `PipelineRunDefinition` is the canonical shape every in-repo pipeline file
//! is resolved into before validation, whatever Tekton kind it was written
//! as. The `Raw*` types mirror the YAML as written.

use serde::Deserialize;

/// A pipeline run resolved from an in-repo file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRunDefinition {
    pub name: String,
    pub tasks: Vec<PipelineTaskDefinition>,
    pub finally: Vec<PipelineTaskDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineTaskDefinition {
    pub name: String,
    pub task_ref: Option<String>,
    /// Steps of an inline task spec, `None` when the task has no spec
    pub task_spec: Option<Vec<StepDefinition>>,
    pub run_after: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDefinition {
    pub name: String,
    pub image: String,
    pub script: Option<String>,
    pub command: Vec<String>,
    pub args: Vec<String>,
}

impl PipelineRunDefinition {
    /// All steps of all inline tasks, in order
    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.tasks
            .iter()
            .chain(&self.finally)
            .filter_map(|t| t.task_spec.as_ref())
            .flatten()
    }
}

/// Prefix of a step image that includes steps from another file
pub const USES_PREFIX: &str = "uses:";

impl StepDefinition {
    /// Include reference when the image is `uses:<path>`
    pub fn uses(&self) -> Option<&str> {
        self.image.strip_prefix(USES_PREFIX).map(str::trim)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawResource {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: RawMetadata,
    #[serde(default)]
    pub spec: Option<RawSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawMetadata {
    #[serde(default)]
    pub name: String,
}

/// Union of the spec fields used by the supported kinds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSpec {
    // PipelineRun
    #[serde(default)]
    pub pipeline_spec: Option<RawPipelineSpec>,
    #[serde(default)]
    pub pipeline_ref: Option<RawRef>,

    // Pipeline
    #[serde(default)]
    pub tasks: Vec<RawPipelineTask>,
    #[serde(default)]
    pub finally: Vec<RawPipelineTask>,

    // Task
    #[serde(default)]
    pub steps: Vec<RawStep>,

    // TaskRun
    #[serde(default)]
    pub task_spec: Option<RawTaskSpec>,
    #[serde(default)]
    pub task_ref: Option<RawRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawPipelineSpec {
    #[serde(default)]
    pub tasks: Vec<RawPipelineTask>,
    #[serde(default)]
    pub finally: Vec<RawPipelineTask>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPipelineTask {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub task_ref: Option<RawRef>,
    #[serde(default)]
    pub task_spec: Option<RawTaskSpec>,
    #[serde(default)]
    pub run_after: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawTaskSpec {
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl From<RawStep> for StepDefinition {
    fn from(raw: RawStep) -> Self {
        Self {
            name: raw.name,
            image: raw.image,
            script: raw.script.filter(|s| !s.is_empty()),
            command: raw.command,
            args: raw.args,
        }
    }
}

impl From<RawPipelineTask> for PipelineTaskDefinition {
    fn from(raw: RawPipelineTask) -> Self {
        Self {
            name: raw.name,
            task_ref: raw.task_ref.map(|r| r.name),
            task_spec: raw
                .task_spec
                .map(|spec| spec.steps.into_iter().map(StepDefinition::from).collect()),
            run_after: raw.run_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_reference() {
        let step = StepDefinition {
            image: "uses:tasks/build.yaml".into(),
            ..Default::default()
        };
        assert_eq!(step.uses(), Some("tasks/build.yaml"));

        let plain = StepDefinition {
            image: "golang:1.22".into(),
            ..Default::default()
        };
        assert_eq!(plain.uses(), None);
    }

    #[test]
    fn test_raw_pipeline_task_conversion() {
        let raw: RawPipelineTask = serde_yaml::from_str(
            r#"
name: build
runAfter: [clone]
taskSpec:
  steps:
  - name: make
    image: golang
    script: ""
"#,
        )
        .unwrap();
        let task = PipelineTaskDefinition::from(raw);
        assert_eq!(task.run_after, vec!["clone".to_string()]);
        let steps = task.task_spec.unwrap();
        assert_eq!(steps[0].name, "make");
        assert_eq!(steps[0].script, None);
    }
}
