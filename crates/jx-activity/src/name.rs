//! Activity name generation
//!
//! A run is named `owner-repository-branch-build`. When the run carries no
//! build number yet, the name is either re-attached to an activity already
//! recorded for the same lighthouse build id, or a fresh build number is
//! allocated by probing 1, 2, 3, ... against the existing names. The chosen
//! build number is written back onto the run's labels.

use std::collections::HashSet;

use crate::labels::LabelKeys;
use crate::model::PipelineActivity;
use crate::naming::to_valid_name;
use crate::run::PipelineRunSnapshot;

/// Generate the activity name for `run`.
///
/// Returns `None` while the run lacks the labels needed for an identity;
/// callers skip the run and retry on a later observation.
pub fn to_activity_name(
    run: &mut PipelineRunSnapshot,
    existing: &[PipelineActivity],
    keys: &LabelKeys,
) -> Option<String> {
    let labels = &run.labels;
    let owner = keys.owner_of(labels);
    let repository = keys.repository_of(labels);
    let branch = keys.branch_of(labels);
    if owner.is_empty() || repository.is_empty() || branch.is_empty() {
        return None;
    }

    let prefix = format!("{}-{}-{}-", owner, repository, branch);
    let build_key = keys.build_number().to_string();

    if let Some(build) = run.labels.get(&build_key).filter(|b| !b.is_empty()) {
        return Some(to_valid_name(&format!("{}{}", prefix, build)));
    }

    let build_id = run.labels.get(&keys.build_id).filter(|b| !b.is_empty())?.clone();

    if let Some(pa) = find_by_build_id(existing, &build_id, keys) {
        tracing::debug!(
            activity = pa.name(),
            build_id = %build_id,
            build = %pa.spec.build,
            "re-attaching run to existing activity"
        );
        run.labels.insert(build_key, pa.spec.build.clone());
        return Some(pa.name().to_string());
    }

    let (build, name) = next_free_build(&prefix, existing);
    tracing::debug!(name = %name, build, "allocated build number");
    run.labels.insert(build_key, build.to_string());
    Some(name)
}

/// Activity already recorded for `build_id` that has a build number
fn find_by_build_id<'a>(
    existing: &'a [PipelineActivity],
    build_id: &str,
    keys: &LabelKeys,
) -> Option<&'a PipelineActivity> {
    existing.iter().find(|pa| {
        let matches = pa.label(&keys.legacy_build_id) == Some(build_id)
            || pa.label(&keys.build_id) == Some(build_id);
        matches && !pa.spec.build.is_empty()
    })
}

/// Lowest build number whose name is not taken. The search has no upper bound.
fn next_free_build(prefix: &str, existing: &[PipelineActivity]) -> (u64, String) {
    let taken: HashSet<&str> = existing.iter().map(|pa| pa.name()).collect();
    let mut build = 1u64;
    loop {
        let name = to_valid_name(&format!("{}{}", prefix, build));
        if !taken.contains(name.as_str()) {
            return (build, name);
        }
        build += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pairs: &[(&str, &str)]) -> PipelineRunSnapshot {
        PipelineRunSnapshot {
            name: "pr-run".into(),
            labels: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn activity(name: &str, build: &str, build_id: Option<(&str, &str)>) -> PipelineActivity {
        let mut pa = PipelineActivity::named(name);
        pa.spec.build = build.to_string();
        if let Some((k, v)) = build_id {
            pa.metadata.labels.insert(k.to_string(), v.to_string());
        }
        pa
    }

    #[test]
    fn test_missing_identity_labels() {
        let keys = LabelKeys::default();
        let mut r = run(&[("owner", "acme"), ("repository", "app"), ("build", "1")]);
        assert_eq!(to_activity_name(&mut r, &[], &keys), None);
    }

    #[test]
    fn test_build_label_present() {
        let keys = LabelKeys::default();
        let mut r = run(&[
            ("owner", "Acme"),
            ("repository", "app"),
            ("branch", "PR-12"),
            ("build", "4"),
        ]);
        assert_eq!(
            to_activity_name(&mut r, &[], &keys).as_deref(),
            Some("acme-app-pr-12-4")
        );
    }

    #[test]
    fn test_no_build_and_no_build_id() {
        let keys = LabelKeys::default();
        let mut r = run(&[("owner", "acme"), ("repository", "app"), ("branch", "main")]);
        assert_eq!(to_activity_name(&mut r, &[], &keys), None);
        assert!(!r.labels.contains_key("build"));
    }

    #[test]
    fn test_first_allocation() {
        let keys = LabelKeys::default();
        let mut r = run(&[
            ("owner", "acme"),
            ("repository", "app"),
            ("branch", "main"),
            ("lighthouse.jenkins-x.io/buildNum", "17"),
        ]);
        assert_eq!(
            to_activity_name(&mut r, &[], &keys).as_deref(),
            Some("acme-app-main-1")
        );
        assert_eq!(r.labels.get("build").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_skips_taken_build_numbers() {
        let keys = LabelKeys::default();
        let existing = vec![
            activity("acme-app-main-1", "1", Some(("lighthouse.jenkins-x.io/buildNum", "10"))),
            activity("acme-app-main-2", "2", Some(("lighthouse.jenkins-x.io/buildNum", "11"))),
            activity("acme-app-main-4", "4", None),
        ];
        let mut r = run(&[
            ("owner", "acme"),
            ("repository", "app"),
            ("branch", "main"),
            ("lighthouse.jenkins-x.io/buildNum", "12"),
        ]);
        assert_eq!(
            to_activity_name(&mut r, &existing, &keys).as_deref(),
            Some("acme-app-main-3")
        );
        assert_eq!(r.labels.get("build").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_reattach_by_build_id() {
        let keys = LabelKeys::default();
        let existing = vec![
            activity("acme-app-main-1", "1", Some(("lighthouse.jenkins-x.io/buildNum", "10"))),
            activity("acme-app-main-2", "2", Some(("buildID", "11"))),
        ];
        let mut r = run(&[
            ("owner", "acme"),
            ("repository", "app"),
            ("branch", "main"),
            ("lighthouse.jenkins-x.io/buildNum", "11"),
        ]);
        assert_eq!(
            to_activity_name(&mut r, &existing, &keys).as_deref(),
            Some("acme-app-main-2")
        );
        assert_eq!(r.labels.get("build").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_reattach_requires_build_number() {
        let keys = LabelKeys::default();
        let existing = vec![activity(
            "acme-app-main-1",
            "",
            Some(("lighthouse.jenkins-x.io/buildNum", "10")),
        )];
        let mut r = run(&[
            ("owner", "acme"),
            ("repository", "app"),
            ("branch", "main"),
            ("lighthouse.jenkins-x.io/buildNum", "10"),
        ]);
        // the matching activity has no build so a new number is picked
        assert_eq!(
            to_activity_name(&mut r, &existing, &keys).as_deref(),
            Some("acme-app-main-2")
        );
    }

    #[test]
    fn test_sequential_allocation_is_gapless() {
        let keys = LabelKeys::default();
        let mut existing: Vec<PipelineActivity> = Vec::new();
        for i in 1..=5 {
            let mut r = run(&[
                ("owner", "acme"),
                ("repository", "app"),
                ("branch", "main"),
                ("lighthouse.jenkins-x.io/buildNum", &format!("id-{}", i)),
            ]);
            let name = to_activity_name(&mut r, &existing, &keys).unwrap();
            assert_eq!(name, format!("acme-app-main-{}", i));
            existing.push(activity(&name, &i.to_string(), None));
        }
    }
}
