//! Backfill of missing activity fields
//!
//! Records created by older tooling, or by a reconciler that saw too few
//! labels, may lack their git coordinates, start time or status. Each gap is
//! filled from the record's own labels and steps. Populated fields are never
//! touched, so the backfill is idempotent.

use crate::labels::LabelKeys;
use crate::model::PipelineActivity;
use crate::status::ActivityStatus;

/// Fill empty identity fields, start time and status of `activity`.
pub fn default_values(activity: &mut PipelineActivity, keys: &LabelKeys) {
    let labels = &activity.metadata.labels;
    let spec = &mut activity.spec;

    if !labels.is_empty() {
        fill(&mut spec.git_owner, keys.owner_of(labels));
        fill(&mut spec.git_repository, keys.repository_of(labels));
        fill(&mut spec.git_branch, keys.branch_of(labels));
        fill(&mut spec.context, keys.context_of(labels));
        fill(&mut spec.build, keys.build_of(labels));
    }

    if spec.started_timestamp.is_none() {
        spec.started_timestamp = spec
            .steps
            .iter()
            .find_map(|s| s.core().started_timestamp);
    }

    if spec.status.is_none() {
        // the last step that knows its status wins
        if let Some(status) = spec
            .steps
            .iter()
            .rev()
            .map(|s| s.status())
            .find(|s| !s.is_none())
        {
            spec.status = status;
        }
    }
}

/// Set `field` to `value` when the field is empty
pub(crate) fn fill(field: &mut String, value: &str) {
    if field.is_empty() && !value.is_empty() {
        *field = value.to_string();
    }
}
