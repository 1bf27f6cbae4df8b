//! Lighthouse trigger configuration (`.lighthouse/<name>/triggers.yaml`)

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::LintError;

/// Agent implied by an inline `pipeline_run_spec`
pub const TEKTON_PIPELINE_AGENT: &str = "tekton-pipeline";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub spec: TriggerSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    #[serde(default)]
    pub presubmits: Vec<Presubmit>,

    #[serde(default)]
    pub postsubmits: Vec<Postsubmit>,
}

/// Fields shared by presubmit and postsubmit jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobBase {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent: String,

    /// Pipeline file, relative to the triggers file
    #[serde(default, rename = "source", skip_serializing_if = "String::is_empty")]
    pub source_path: String,

    /// Inline pipeline run spec, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_run_spec: Option<serde_yaml::Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_branches: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub run_if_changed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presubmit {
    #[serde(flatten)]
    pub base: JobBase,

    #[serde(default)]
    pub always_run: bool,

    #[serde(default)]
    pub optional: bool,

    /// Regex matched against pull request comments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trigger: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rerun_command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postsubmit {
    #[serde(flatten)]
    pub base: JobBase,
}

impl TriggerConfig {
    /// Load a triggers file. An empty file is an empty config.
    pub fn from_file(path: &Path) -> Result<Self, LintError> {
        let data = fs::read_to_string(path).map_err(|source| LintError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&data).map_err(|source| LintError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All jobs, presubmits first
    pub fn jobs(&self) -> impl Iterator<Item = &JobBase> {
        self.spec
            .presubmits
            .iter()
            .map(|p| &p.base)
            .chain(self.spec.postsubmits.iter().map(|p| &p.base))
    }

    fn jobs_mut(&mut self) -> impl Iterator<Item = &mut JobBase> {
        self.spec
            .presubmits
            .iter_mut()
            .map(|p| &mut p.base)
            .chain(self.spec.postsubmits.iter_mut().map(|p| &mut p.base))
    }

    /// Default the agent of jobs that carry an inline pipeline run spec
    pub fn apply_defaults(&mut self) {
        for job in self.jobs_mut() {
            if job.agent.is_empty() && job.pipeline_run_spec.is_some() {
                job.agent = TEKTON_PIPELINE_AGENT.to_string();
            }
        }
    }

    /// Semantic problems that parsing alone does not catch
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        check_names(
            "presubmit",
            self.spec.presubmits.iter().map(|p| &p.base),
            &mut problems,
        );
        check_names(
            "postsubmit",
            self.spec.postsubmits.iter().map(|p| &p.base),
            &mut problems,
        );

        for job in self.jobs() {
            for pattern in job.branches.iter().chain(&job.skip_branches) {
                check_regex(&job.name, "branch", pattern, &mut problems);
            }
            if !job.run_if_changed.is_empty() {
                check_regex(&job.name, "run_if_changed", &job.run_if_changed, &mut problems);
            }
        }
        for presubmit in &self.spec.presubmits {
            if !presubmit.trigger.is_empty() {
                check_regex(&presubmit.base.name, "trigger", &presubmit.trigger, &mut problems);
            }
        }

        problems
    }
}

fn check_names<'a>(kind: &str, jobs: impl Iterator<Item = &'a JobBase>, problems: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (i, job) in jobs.enumerate() {
        if job.name.is_empty() {
            problems.push(format!("{} {} has no name", kind, i));
        } else if !seen.insert(job.name.as_str()) {
            problems.push(format!("duplicate {} name {:?}", kind, job.name));
        }
    }
}

fn check_regex(job: &str, field: &str, pattern: &str, problems: &mut Vec<String>) {
    if let Err(e) = Regex::new(pattern) {
        problems.push(format!("job {:?} has invalid {} regex {:?}: {}", job, field, pattern, e));
    }
}
