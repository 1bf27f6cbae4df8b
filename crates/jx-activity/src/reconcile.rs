//! Folding a run observation into its activity record
//!
//! `Reconciler::reconcile` is the entry point: it names the run, picks the
//! record already stored under that name (or starts a new one), and applies
//! the observation. Fields already populated on the record are kept, so a
//! record never loses information when an older or partial observation is
//! applied.

use crate::clock::{Clock, SystemClock};
use crate::defaults::fill;
use crate::labels::LabelKeys;
use crate::merge::{merge_steps, MergeMode};
use crate::model::{ActivityStep, PipelineActivity, API_VERSION, INITIALISING_STAGE, KIND};
use crate::name::to_activity_name;
use crate::rollup::{StatusAggregator, StepRollup};
use crate::run::PipelineRunSnapshot;
use crate::stages::build_stages;
use crate::status::ActivityStatus;

/// Result of reconciling one observation
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub name: String,
    pub activity: PipelineActivity,
    /// True when no record existed under `name`
    pub created: bool,
}

/// Derives activity records from pipeline run snapshots
pub struct Reconciler {
    keys: LabelKeys,
    clock: Box<dyn Clock>,
    aggregator: Box<dyn StatusAggregator>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(LabelKeys::default())
    }
}

impl Reconciler {
    /// Reconciler using the wall clock and the default step rollup
    pub fn new(keys: LabelKeys) -> Self {
        Self {
            keys,
            clock: Box::new(SystemClock),
            aggregator: Box::new(StepRollup),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_aggregator(mut self, aggregator: impl StatusAggregator + 'static) -> Self {
        self.aggregator = Box::new(aggregator);
        self
    }

    pub fn keys(&self) -> &LabelKeys {
        &self.keys
    }

    /// Name the run, writing any allocated build number onto its labels
    pub fn activity_name(
        &self,
        run: &mut PipelineRunSnapshot,
        existing: &[PipelineActivity],
    ) -> Option<String> {
        to_activity_name(run, existing, &self.keys)
    }

    /// Name the run and fold it into the matching record of `existing`.
    ///
    /// Returns `None` while the run has no identity yet.
    pub fn reconcile(
        &self,
        run: &mut PipelineRunSnapshot,
        existing: &[PipelineActivity],
        mode: MergeMode,
    ) -> Option<Reconciled> {
        let Some(name) = self.activity_name(run, existing) else {
            tracing::debug!(run = %run.name, "run has no activity identity yet");
            return None;
        };

        let found = existing.iter().find(|pa| pa.name() == name);
        let created = found.is_none();
        let mut activity = found
            .cloned()
            .unwrap_or_else(|| PipelineActivity::named(name.as_str()));

        self.apply(run, &mut activity, mode);

        tracing::info!(
            activity = %name,
            created,
            status = %activity.spec.status,
            steps = activity.spec.steps.len(),
            "reconciled pipeline activity"
        );

        Some(Reconciled {
            name,
            activity,
            created,
        })
    }

    /// Apply one observation of `run` to `activity`
    pub fn apply(&self, run: &PipelineRunSnapshot, activity: &mut PipelineActivity, mode: MergeMode) {
        let keys = &self.keys;
        let now = self.clock.now();

        if activity.api_version.is_empty() {
            activity.api_version = API_VERSION.to_string();
        }
        if activity.kind.is_empty() {
            activity.kind = KIND.to_string();
        }
        activity.metadata.namespace = run.namespace.clone();

        for (k, v) in &run.annotations {
            if keys.propagates_annotation(k) {
                activity.metadata.annotations.insert(k.clone(), v.clone());
            }
        }
        for (k, v) in &run.labels {
            activity.metadata.labels.insert(k.clone(), v.clone());
        }

        let labels = &run.labels;
        let spec = &mut activity.spec;
        fill(&mut spec.git_owner, keys.owner_of(labels));
        fill(&mut spec.git_repository, keys.repository_of(labels));
        fill(&mut spec.git_branch, keys.branch_of(labels));
        fill(&mut spec.build, keys.build_of(labels));
        fill(&mut spec.context, keys.context_of(labels));
        fill(&mut spec.base_sha, label(labels, &keys.base_sha));
        fill(&mut spec.last_commit_sha, label(labels, &keys.last_commit_sha));
        if spec.pipeline.is_empty()
            && !spec.git_owner.is_empty()
            && !spec.git_repository.is_empty()
            && !spec.git_branch.is_empty()
        {
            spec.pipeline = format!("{}/{}/{}", spec.git_owner, spec.git_repository, spec.git_branch);
        }
        fill(&mut spec.git_url, label(&run.annotations, &keys.clone_uri));

        let built = build_stages(run, now);
        merge_steps(&mut spec.steps, built, mode);

        if spec.started_timestamp.is_none() {
            spec.started_timestamp = spec
                .steps
                .first()
                .and_then(ActivityStep::as_stage)
                .and_then(|s| s.core.started_timestamp);
        }
        if spec.started_timestamp.is_none() {
            spec.started_timestamp = Some(now);
        }

        if spec.steps.is_empty() && mode == MergeMode::Preserve {
            spec.steps
                .push(ActivityStep::stage(INITIALISING_STAGE, ActivityStatus::Running));
        }

        if let Some(pod) = run.pod_name() {
            activity
                .metadata
                .labels
                .insert(keys.pod_name.clone(), pod.to_string());
        }

        self.aggregator.update_status(activity);
    }
}

fn label<'a>(map: &'a std::collections::BTreeMap<String, String>, key: &str) -> &'a str {
    map.get(key).map(String::as_str).unwrap_or("")
}
