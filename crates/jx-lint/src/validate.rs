//! Schema validation of resolved run definitions

use std::collections::{HashMap, HashSet};

use crate::definition::{PipelineRunDefinition, PipelineTaskDefinition};
use crate::error::{FieldError, FieldErrors};

/// Maximum length of a DNS-1123 label
const MAX_NAME_LEN: usize = 63;

/// Validates a run definition, reporting every violation found
pub trait RunValidator {
    fn validate(&self, definition: &PipelineRunDefinition) -> Result<(), FieldErrors>;
}

/// Structural checks modelled on the Tekton pipeline schema
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl RunValidator for SchemaValidator {
    fn validate(&self, definition: &PipelineRunDefinition) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if definition.tasks.is_empty() {
            errors.push(FieldError::new(
                "expected at least one, got none",
                "spec.pipelineSpec.tasks",
            ));
        }

        let mut seen = HashSet::new();
        let groups = [("tasks", &definition.tasks), ("finally", &definition.finally)];
        for (field, tasks) in groups {
            for (i, task) in tasks.iter().enumerate() {
                let path = format!("spec.pipelineSpec.{}[{}]", field, i);
                if !seen.insert(task.name.as_str()) {
                    errors.push(FieldError::new(
                        format!("invalid value: duplicate task name {:?}", task.name),
                        format!("{}.name", path),
                    ));
                }
                self.validate_task(task, &path, &mut errors);
            }
        }

        validate_run_after(&definition.tasks, &mut errors);

        errors.into_result()
    }
}

impl SchemaValidator {
    /// DNS-1123 label: lowercase alphanumerics and '-', alphanumeric at both ends
    fn valid_name(&self, name: &str) -> bool {
        let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        !name.is_empty()
            && name.len() <= MAX_NAME_LEN
            && name.chars().all(|c| alnum(c) || c == '-')
            && name.starts_with(alnum)
            && name.ends_with(alnum)
    }

    fn validate_task(&self, task: &PipelineTaskDefinition, path: &str, errors: &mut FieldErrors) {
        if task.name.is_empty() {
            errors.push(FieldError::new("missing field(s)", format!("{}.name", path)));
        } else if !self.valid_name(&task.name) {
            errors.push(FieldError::new(
                format!("invalid value: {:?} must be a valid DNS label", task.name),
                format!("{}.name", path),
            ));
        }

        match (&task.task_ref, &task.task_spec) {
            (Some(_), Some(_)) => errors.push(FieldError {
                message: "expected exactly one, got both".to_string(),
                paths: vec![format!("{}.taskRef", path), format!("{}.taskSpec", path)],
            }),
            (None, None) => errors.push(FieldError {
                message: "expected exactly one, got neither".to_string(),
                paths: vec![format!("{}.taskRef", path), format!("{}.taskSpec", path)],
            }),
            _ => {}
        }

        let Some(steps) = &task.task_spec else {
            return;
        };
        if steps.is_empty() {
            errors.push(FieldError::new(
                "expected at least one, got none",
                format!("{}.taskSpec.steps", path),
            ));
        }

        let mut step_names = HashSet::new();
        for (i, step) in steps.iter().enumerate() {
            let step_path = format!("{}.taskSpec.steps[{}]", path, i);
            if !step.name.is_empty() {
                if !self.valid_name(&step.name) {
                    errors.push(FieldError::new(
                        format!("invalid value: {:?} must be a valid DNS label", step.name),
                        format!("{}.name", step_path),
                    ));
                }
                if !step_names.insert(step.name.as_str()) {
                    errors.push(FieldError::new(
                        format!("invalid value: duplicate step name {:?}", step.name),
                        format!("{}.name", step_path),
                    ));
                }
            }
            if step.image.trim().is_empty() {
                errors.push(FieldError::new("missing field(s)", format!("{}.image", step_path)));
            }
            if step.script.is_some() && !step.command.is_empty() {
                errors.push(FieldError::new(
                    "script cannot be used with command",
                    format!("{}.script", step_path),
                ));
            }
        }
    }
}

/// runAfter must name another existing task and must not form a cycle
fn validate_run_after(tasks: &[PipelineTaskDefinition], errors: &mut FieldErrors) {
    let names: HashSet<&str> = tasks.iter().map(|t| t.name.as_str()).collect();

    for (i, task) in tasks.iter().enumerate() {
        for dep in &task.run_after {
            if dep == &task.name || !names.contains(dep.as_str()) {
                errors.push(FieldError::new(
                    format!("invalid value: runAfter {:?} is not another pipeline task", dep),
                    format!("spec.pipelineSpec.tasks[{}].runAfter", i),
                ));
            }
        }
    }

    let graph: HashMap<&str, Vec<&str>> = tasks
        .iter()
        .map(|t| (t.name.as_str(), t.run_after.iter().map(String::as_str).collect()))
        .collect();
    let mut done = HashSet::new();
    for task in tasks {
        let mut stack = Vec::new();
        if let Some(cycle_at) = find_cycle(task.name.as_str(), &graph, &mut stack, &mut done) {
            errors.push(FieldError::new(
                format!("invalid value: cycle detected in runAfter at task {:?}", cycle_at),
                "spec.pipelineSpec.tasks",
            ));
            return;
        }
    }
}

fn find_cycle<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Option<&'a str> {
    if done.contains(node) {
        return None;
    }
    if stack.contains(&node) {
        return Some(node);
    }
    stack.push(node);
    for dep in graph.get(node).into_iter().flatten() {
        if *dep == node {
            continue;
        }
        if let Some(found) = find_cycle(*dep, graph, stack, done) {
            return Some(found);
        }
    }
    stack.pop();
    done.insert(node);
    None
}
