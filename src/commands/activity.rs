//! `jx-pipeline activity` subcommands

use jx_activity::{
    default_values, ActivityStatus, LabelKeys, MergeMode, PipelineActivity, PipelineRunSnapshot,
    Reconciled, Reconciler,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::CliError;
use crate::store::ActivityStore;

/// Fold the run snapshot at `run_path` into the store.
///
/// Returns `None` when the run has no identity yet; nothing is stored then.
pub fn reconcile_run(
    store: &dyn ActivityStore,
    reconciler: &Reconciler,
    run_path: &Path,
    mode: MergeMode,
) -> Result<Option<Reconciled>, CliError> {
    let json = fs::read_to_string(run_path).map_err(|source| CliError::Read {
        path: run_path.to_path_buf(),
        source,
    })?;
    let mut run = PipelineRunSnapshot::from_json(&json).map_err(|source| CliError::RunParse {
        path: run_path.to_path_buf(),
        source,
    })?;

    let existing = load_all(store, reconciler.keys())?;
    let Some(reconciled) = reconciler.reconcile(&mut run, &existing, mode) else {
        tracing::warn!(run = %run.name, "pipeline run has no owner, repository or branch yet");
        return Ok(None);
    };

    store.upsert(&reconciled.name, &reconciled.activity)?;
    Ok(Some(reconciled))
}

/// All stored records with missing fields backfilled from their labels and steps
fn load_all(store: &dyn ActivityStore, keys: &LabelKeys) -> Result<Vec<PipelineActivity>, CliError> {
    let mut activities = store.list()?;
    for activity in activities.iter_mut() {
        default_values(activity, keys);
    }
    Ok(activities)
}

pub fn get_activity(
    store: &dyn ActivityStore,
    keys: &LabelKeys,
    name: &str,
) -> Result<PipelineActivity, CliError> {
    let mut activity = store
        .get(name)?
        .ok_or_else(|| CliError::NotFound(name.to_string()))?;
    default_values(&mut activity, keys);
    Ok(activity)
}

/// One line of `activity list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub name: String,
    pub status: ActivityStatus,
    pub build: String,
    pub steps: usize,
}

impl From<&PipelineActivity> for ActivityRow {
    fn from(activity: &PipelineActivity) -> Self {
        Self {
            name: activity.name().to_string(),
            status: activity.spec.status,
            build: activity.spec.build.clone(),
            steps: activity.spec.steps.len(),
        }
    }
}

pub fn list_activities(
    store: &dyn ActivityStore,
    keys: &LabelKeys,
) -> Result<Vec<ActivityRow>, CliError> {
    Ok(load_all(store, keys)?.iter().map(ActivityRow::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileActivityStore;
    use chrono::{TimeZone, Utc};
    use jx_activity::FixedClock;
    use tempfile::TempDir;

    const RUN: &str = r#"{
        "name": "acme-app-main-abc12",
        "labels": {
            "owner": "acme",
            "repository": "app",
            "branch": "main",
            "lighthouse.jenkins-x.io/buildNum": "17"
        },
        "taskRuns": []
    }"#;

    fn reconciler() -> Reconciler {
        Reconciler::default().with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_reconcile_stores_record() {
        let dir = TempDir::new().unwrap();
        let run_path = dir.path().join("run.json");
        fs::write(&run_path, RUN).unwrap();
        let store = FileActivityStore::new(dir.path().join("activities"));

        let first = reconcile_run(&store, &reconciler(), &run_path, MergeMode::Preserve)
            .unwrap()
            .unwrap();
        assert_eq!(first.name, "acme-app-main-1");
        assert!(first.created);

        let second = reconcile_run(&store, &reconciler(), &run_path, MergeMode::Preserve)
            .unwrap()
            .unwrap();
        assert_eq!(second.name, "acme-app-main-1");
        assert!(!second.created);

        let keys = LabelKeys::default();
        let rows = list_activities(&store, &keys).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].build, "1");
        assert_eq!(get_activity(&store, &keys, "acme-app-main-1").unwrap(), second.activity);
    }

    #[test]
    fn test_run_without_identity_not_stored() {
        let dir = TempDir::new().unwrap();
        let run_path = dir.path().join("run.json");
        fs::write(&run_path, r#"{"name": "x", "labels": {"owner": "acme"}}"#).unwrap();
        let store = FileActivityStore::new(dir.path().join("activities"));

        let result = reconcile_run(&store, &reconciler(), &run_path, MergeMode::Preserve).unwrap();
        assert!(result.is_none());
        assert!(list_activities(&store, &LabelKeys::default()).unwrap().is_empty());
    }

    #[test]
    fn test_bad_run_file() {
        let dir = TempDir::new().unwrap();
        let run_path = dir.path().join("run.json");
        fs::write(&run_path, "not json").unwrap();
        let store = FileActivityStore::new(dir.path().join("activities"));

        let err = reconcile_run(&store, &reconciler(), &run_path, MergeMode::Preserve).unwrap_err();
        assert!(matches!(err, CliError::RunParse { .. }));
        let err = get_activity(&store, &LabelKeys::default(), "missing").unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));
    }

    #[test]
    fn test_records_from_older_tooling_backfilled() {
        let dir = TempDir::new().unwrap();
        let store = FileActivityStore::new(dir.path());
        let mut legacy = PipelineActivity::named("acme-app-main-4");
        for (k, v) in [("owner", "acme"), ("repository", "app"), ("branch", "main"), ("build", "4")] {
            legacy.metadata.labels.insert(k.to_string(), v.to_string());
        }
        legacy.spec.steps.push(jx_activity::ActivityStep::stage(
            "build",
            ActivityStatus::Succeeded,
        ));
        store.upsert("acme-app-main-4", &legacy).unwrap();

        let activity = get_activity(&store, &LabelKeys::default(), "acme-app-main-4").unwrap();
        assert_eq!(activity.spec.git_owner, "acme");
        assert_eq!(activity.spec.build, "4");
        assert_eq!(activity.spec.status, ActivityStatus::Succeeded);
    }
}
