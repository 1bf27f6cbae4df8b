//! Resolution of in-repo pipeline files into run definitions
//!
//! Pipelines may be written as a PipelineRun, Pipeline, Task or TaskRun.
//! Steps may pull steps in from other files with `image: uses:<path>`;
//! local paths are resolved relative to the including file and followed
//! recursively. References carrying a `@version` point at a remote catalog
//! and are left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::definition::{
    PipelineRunDefinition, PipelineTaskDefinition, RawResource, StepDefinition,
};
use crate::error::ResolveError;

/// Turns the content of a pipeline file into a canonical run definition
pub trait RunDefinitionResolver {
    /// `data` is the content of the file at `path`
    fn resolve(&self, data: &str, path: &Path) -> Result<PipelineRunDefinition, ResolveError>;
}

/// Resolver for Tekton YAML resources with local `uses:` includes
#[derive(Debug, Clone, Copy, Default)]
pub struct TektonResolver;

impl RunDefinitionResolver for TektonResolver {
    fn resolve(&self, data: &str, path: &Path) -> Result<PipelineRunDefinition, ResolveError> {
        let mut visiting = vec![normalize(path)];
        self.resolve_data(data, path, &mut visiting)
    }
}

impl TektonResolver {
    fn resolve_data(
        &self,
        data: &str,
        path: &Path,
        visiting: &mut Vec<PathBuf>,
    ) -> Result<PipelineRunDefinition, ResolveError> {
        let raw: RawResource = serde_yaml::from_str(data)?;
        let mut definition = to_definition(raw, path)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        for task in definition.tasks.iter_mut().chain(definition.finally.iter_mut()) {
            if let Some(steps) = task.task_spec.take() {
                task.task_spec = Some(self.expand_steps(steps, dir, visiting)?);
            }
        }
        Ok(definition)
    }

    fn expand_steps(
        &self,
        steps: Vec<StepDefinition>,
        dir: &Path,
        visiting: &mut Vec<PathBuf>,
    ) -> Result<Vec<StepDefinition>, ResolveError> {
        let mut expanded = Vec::with_capacity(steps.len());
        for step in steps {
            let Some(reference) = step.uses().map(str::to_string) else {
                expanded.push(step);
                continue;
            };
            if reference.contains('@') {
                tracing::debug!(reference = %reference, "leaving remote include unresolved");
                expanded.push(step);
                continue;
            }

            let include_path = dir.join(&reference);
            let included = self.resolve_include(&include_path, visiting)?;
            let mut matched: Vec<StepDefinition> = included
                .steps()
                .filter(|s| step.name.is_empty() || s.name == step.name)
                .cloned()
                .collect();
            if matched.is_empty() && !step.name.is_empty() {
                return Err(ResolveError::IncludedStepNotFound {
                    step: step.name,
                    path: include_path,
                });
            }
            for m in matched.iter_mut() {
                apply_overrides(m, &step);
            }
            tracing::debug!(
                include = %include_path.display(),
                steps = matched.len(),
                "expanded include"
            );
            expanded.extend(matched);
        }
        Ok(expanded)
    }

    fn resolve_include(
        &self,
        path: &Path,
        visiting: &mut Vec<PathBuf>,
    ) -> Result<PipelineRunDefinition, ResolveError> {
        let key = normalize(path);
        if visiting.contains(&key) {
            return Err(ResolveError::IncludeCycle(path.to_path_buf()));
        }
        let data = fs::read_to_string(path).map_err(|source| ResolveError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        visiting.push(key);
        let result = self.resolve_data(&data, path, visiting);
        visiting.pop();
        result
    }
}

/// Script, command and args set on the including step win
fn apply_overrides(step: &mut StepDefinition, including: &StepDefinition) {
    if including.script.is_some() {
        step.script = including.script.clone();
    }
    if !including.command.is_empty() {
        step.command = including.command.clone();
    }
    if !including.args.is_empty() {
        step.args = including.args.clone();
    }
}

fn to_definition(raw: RawResource, path: &Path) -> Result<PipelineRunDefinition, ResolveError> {
    let name = if raw.metadata.name.is_empty() {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    } else {
        raw.metadata.name
    };
    let kind = raw.kind;
    let missing = || ResolveError::MissingSpec { kind: kind.clone() };
    let spec = raw.spec.ok_or_else(missing)?;

    let (tasks, finally) = match kind.as_str() {
        "PipelineRun" => {
            if let Some(r) = spec.pipeline_ref {
                return Err(ResolveError::PipelineRef(r.name));
            }
            let pipeline = spec.pipeline_spec.ok_or_else(missing)?;
            (pipeline.tasks, pipeline.finally)
        }
        "Pipeline" => (spec.tasks, spec.finally),
        "Task" => {
            let task = PipelineTaskDefinition {
                name: name.clone(),
                task_spec: Some(spec.steps.into_iter().map(StepDefinition::from).collect()),
                ..Default::default()
            };
            return Ok(PipelineRunDefinition {
                name,
                tasks: vec![task],
                finally: Vec::new(),
            });
        }
        "TaskRun" => {
            if spec.task_ref.is_none() && spec.task_spec.is_none() {
                return Err(missing());
            }
            let task = PipelineTaskDefinition {
                name: name.clone(),
                task_ref: spec.task_ref.map(|r| r.name),
                task_spec: spec
                    .task_spec
                    .map(|t| t.steps.into_iter().map(StepDefinition::from).collect()),
                run_after: Vec::new(),
            };
            return Ok(PipelineRunDefinition {
                name,
                tasks: vec![task],
                finally: Vec::new(),
            });
        }
        other => return Err(ResolveError::UnsupportedKind(other.to_string())),
    };

    Ok(PipelineRunDefinition {
        name,
        tasks: tasks.into_iter().map(PipelineTaskDefinition::from).collect(),
        finally: finally.into_iter().map(PipelineTaskDefinition::from).collect(),
    })
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
