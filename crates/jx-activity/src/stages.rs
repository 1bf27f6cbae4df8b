//! Stage building from task run status
//!
//! Each pipeline task becomes one stage, each container step of the task
//! becomes one sub-step. Steps of a task run sequentially, so a running
//! container only counts as Running when the step before it has terminated;
//! otherwise it is still waiting on its predecessor and reports Pending.

use chrono::{DateTime, Utc};

use crate::model::{ActivityStep, CoreStep, StageStep};
use crate::naming::{humanize, stage_name};
use crate::run::{PipelineRunSnapshot, StepSnapshot};
use crate::status::ActivityStatus;

/// Build one stage per task that has reported at least one step.
pub fn build_stages(run: &PipelineRunSnapshot, now: DateTime<Utc>) -> Vec<ActivityStep> {
    let mut stages = Vec::new();

    for task in &run.task_runs {
        let Some(status) = &task.status else {
            tracing::debug!(task = %task.pipeline_task_name, "task has no status yet");
            continue;
        };

        let mut previous_terminated = false;
        let steps: Vec<CoreStep> = status
            .steps
            .iter()
            .map(|step| to_sub_step(step, &mut previous_terminated, now))
            .collect();

        if let Some(stage) = to_stage(&task.pipeline_task_name, steps, now) {
            stages.push(ActivityStep::Stage(stage));
        }
    }

    stages
}

/// Derive one sub-step, updating the previous-step-terminated flag
fn to_sub_step(step: &StepSnapshot, previous_terminated: &mut bool, now: DateTime<Utc>) -> CoreStep {
    let mut status = ActivityStatus::Pending;
    let mut started = None;
    let mut completed = None;

    if let Some(terminated) = &step.terminated {
        if terminated.exit_code == 0 {
            status = ActivityStatus::Succeeded;
        } else if terminated.finished_at.is_some() {
            status = ActivityStatus::Failed;
        }
        started = terminated.started_at;
        completed = terminated.finished_at;
        *previous_terminated = true;
    } else if let Some(running) = &step.running {
        if *previous_terminated {
            started = running.started_at;
            status = ActivityStatus::Running;
        }
        *previous_terminated = false;
    }

    if status.is_terminated() && completed.is_none() {
        completed = Some(now);
    }

    CoreStep {
        name: humanize(&step.name),
        description: String::new(),
        status,
        started_timestamp: started,
        completed_timestamp: completed,
    }
}

fn to_stage(task_name: &str, mut steps: Vec<CoreStep>, now: DateTime<Utc>) -> Option<StageStep> {
    let first = steps.first_mut()?;
    if first.started_timestamp.is_none() {
        first.started_timestamp = Some(now);
    }
    let status = first.status;
    let started = first.started_timestamp;
    let completed = steps.last().and_then(|s| s.completed_timestamp);

    Some(StageStep {
        core: CoreStep {
            name: stage_name(task_name),
            description: String::new(),
            status,
            started_timestamp: started,
            completed_timestamp: completed,
        },
        steps,
    })
}
