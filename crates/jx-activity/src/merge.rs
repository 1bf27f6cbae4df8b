//! Merging freshly built stages into an activity's steps
//!
//! Promote and Preview steps are appended to activities by tools outside the
//! pipeline run and must survive every merge.

use serde::{Deserialize, Serialize};

use crate::model::{ActivityStep, RELEASE_STAGE};

/// How freshly built stages are combined with existing steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Keep existing real stages; only fill an activity that has none
    #[default]
    Preserve,
    /// Replace stages by name, inserting new ones before promotions
    Overwrite,
}

/// Merge `built` stages into `steps` according to `mode`.
pub fn merge_steps(steps: &mut Vec<ActivityStep>, built: Vec<ActivityStep>, mode: MergeMode) {
    match mode {
        MergeMode::Overwrite => overwrite(steps, built),
        MergeMode::Preserve => preserve(steps, built),
    }
}

fn overwrite(steps: &mut Vec<ActivityStep>, built: Vec<ActivityStep>) {
    for stage in built {
        let ActivityStep::Stage(new_stage) = stage else {
            continue;
        };

        let existing = steps.iter_mut().find_map(|s| match s {
            ActivityStep::Stage(old) if old.core.name == new_stage.core.name => Some(old),
            _ => None,
        });
        if let Some(old) = existing {
            *old = new_stage;
            continue;
        }

        match steps.iter().position(ActivityStep::is_promotion) {
            Some(idx) => steps.insert(idx, ActivityStep::Stage(new_stage)),
            None => steps.push(ActivityStep::Stage(new_stage)),
        }
    }
}

fn preserve(steps: &mut Vec<ActivityStep>, built: Vec<ActivityStep>) {
    let has_real_stage = steps
        .iter()
        .any(|s| matches!(s, ActivityStep::Stage(stage) if stage.core.name != RELEASE_STAGE));
    if has_real_stage {
        return;
    }

    let promotions = steps.drain(..).filter(ActivityStep::is_promotion);
    let merged: Vec<ActivityStep> = built.into_iter().chain(promotions).collect();
    *steps = merged;
}
