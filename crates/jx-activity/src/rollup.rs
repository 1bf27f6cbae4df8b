//! Status aggregation over an activity's steps

use chrono::{DateTime, Utc};

use crate::model::{ActivityStep, CoreStep, PipelineActivity, StageStep};
use crate::status::ActivityStatus;

/// Derives the rolled-up status of an activity from its steps
pub trait StatusAggregator {
    fn update_status(&self, activity: &mut PipelineActivity);
}

/// Default aggregation: stages from their sub-steps, the record from its steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepRollup;

impl StatusAggregator for StepRollup {
    fn update_status(&self, activity: &mut PipelineActivity) {
        let spec = &mut activity.spec;
        for step in spec.steps.iter_mut() {
            if let ActivityStep::Stage(stage) = step {
                roll_up_stage(stage);
            }
        }

        if spec.steps.is_empty() {
            if spec.status.is_none() {
                spec.status = ActivityStatus::Pending;
            }
            return;
        }

        let cores: Vec<&CoreStep> = spec.steps.iter().map(ActivityStep::core).collect();
        spec.status = combine(cores.iter().map(|c| c.status));
        spec.completed_timestamp = if spec.status.is_terminated() {
            latest_completed(cores.iter().copied()).or(spec.completed_timestamp)
        } else {
            None
        };
    }
}

fn roll_up_stage(stage: &mut StageStep) {
    if stage.steps.is_empty() {
        return;
    }
    stage.core.status = combine(stage.steps.iter().map(|s| s.status));
    if stage.core.status.is_terminated() {
        if stage.core.completed_timestamp.is_none() {
            stage.core.completed_timestamp = latest_completed(stage.steps.iter());
        }
    } else {
        stage.core.completed_timestamp = None;
    }
}

/// Combine child statuses into a parent status
fn combine(statuses: impl Iterator<Item = ActivityStatus>) -> ActivityStatus {
    let mut any_failed = false;
    let mut any_aborted = false;
    let mut any_progress = false;
    let mut all_terminated = true;

    for status in statuses {
        match status {
            ActivityStatus::Failed => any_failed = true,
            ActivityStatus::Aborted => any_aborted = true,
            ActivityStatus::Running => any_progress = true,
            _ => {}
        }
        if status.is_terminated() {
            any_progress = true;
        } else {
            all_terminated = false;
        }
    }

    if any_failed {
        ActivityStatus::Failed
    } else if any_aborted {
        ActivityStatus::Aborted
    } else if all_terminated {
        ActivityStatus::Succeeded
    } else if any_progress {
        ActivityStatus::Running
    } else {
        ActivityStatus::Pending
    }
}

fn latest_completed<'a>(steps: impl Iterator<Item = &'a CoreStep>) -> Option<DateTime<Utc>> {
    steps.filter_map(|s| s.completed_timestamp).max()
}
