//! PipelineActivity derivation from observed pipeline runs.
//!
//! A pipeline run is observed many times while it executes. Each observation
//! is folded into a single activity record named after the run's owner,
//! repository, branch and build number, without losing information recorded
//! by earlier observations or by other tools.

mod clock;
mod defaults;
mod labels;
mod merge;
mod model;
mod name;
mod naming;
mod reconcile;
mod rollup;
mod run;
mod stages;
mod status;

pub use clock::{Clock, FixedClock, SystemClock};
pub use defaults::default_values;
pub use labels::{resolve_label, LabelKeys};
pub use merge::{merge_steps, MergeMode};
pub use model::{
    ActivitySpec, ActivityStep, CoreStep, ObjectMeta, PipelineActivity, PreviewStep, PromoteStep,
    StageStep, API_VERSION, INITIALISING_STAGE, KIND, RELEASE_STAGE,
};
pub use name::to_activity_name;
pub use naming::{humanize, stage_name, to_valid_name};
pub use reconcile::{Reconciled, Reconciler};
pub use rollup::{StatusAggregator, StepRollup};
pub use run::{
    PipelineRunSnapshot, StepRunning, StepSnapshot, StepTerminated, StepWaiting, TaskRunSnapshot,
    TaskRunStatus,
};
pub use stages::build_stages;
pub use status::ActivityStatus;
