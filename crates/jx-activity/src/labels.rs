//! Label and annotation lookup
//!
//! Every identity field can be carried by two labels: the short legacy key
//! and the lighthouse namespaced key. The short key is tried first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Return the first non-empty value among `keys`, or `""` when none match.
pub fn resolve_label<'a, K: AsRef<str>>(labels: &'a BTreeMap<String, String>, keys: &[K]) -> &'a str {
    keys.iter()
        .filter_map(|k| labels.get(k.as_ref()))
        .map(String::as_str)
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

/// Label and annotation keys consulted by the reconciler
///
/// Passed by reference into every operation; nothing reads keys from global
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelKeys {
    pub owner: Vec<String>,
    pub repository: Vec<String>,
    pub branch: Vec<String>,
    pub build: Vec<String>,
    pub context: Vec<String>,

    /// Label holding the lighthouse build id of a run
    pub build_id: String,

    /// Build id label written by older tooling onto activities
    pub legacy_build_id: String,

    pub base_sha: String,
    pub last_commit_sha: String,

    /// Label recording the pod that ran the pipeline
    pub pod_name: String,

    /// Annotation carrying the git clone URL
    pub clone_uri: String,

    /// Annotations never copied from a run onto its activity
    pub excluded_annotations: Vec<String>,
}

impl Default for LabelKeys {
    fn default() -> Self {
        Self {
            owner: keys(&["owner", "lighthouse.jenkins-x.io/refs.org"]),
            repository: keys(&["repository", "lighthouse.jenkins-x.io/refs.repo"]),
            branch: keys(&["branch", "lighthouse.jenkins-x.io/branch"]),
            build: keys(&["build", "lighthouse.jenkins-x.io/buildNum"]),
            context: keys(&["context", "lighthouse.jenkins-x.io/context"]),
            build_id: "lighthouse.jenkins-x.io/buildNum".to_string(),
            legacy_build_id: "buildID".to_string(),
            base_sha: "lighthouse.jenkins-x.io/baseSHA".to_string(),
            last_commit_sha: "lighthouse.jenkins-x.io/lastCommitSHA".to_string(),
            pod_name: "podName".to_string(),
            clone_uri: "lighthouse.jenkins-x.io/cloneURI".to_string(),
            excluded_annotations: keys(&[
                "lighthouse.jenkins-x.io/traceparent",
                "lighthouse.jenkins-x.io/tracestate",
            ]),
        }
    }
}

fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl LabelKeys {
    /// Key of the build number label written back onto runs
    pub fn build_number(&self) -> &str {
        self.build.first().map(String::as_str).unwrap_or("build")
    }

    pub fn owner_of<'a>(&self, labels: &'a BTreeMap<String, String>) -> &'a str {
        resolve_label(labels, self.owner.as_slice())
    }

    pub fn repository_of<'a>(&self, labels: &'a BTreeMap<String, String>) -> &'a str {
        resolve_label(labels, self.repository.as_slice())
    }

    pub fn branch_of<'a>(&self, labels: &'a BTreeMap<String, String>) -> &'a str {
        resolve_label(labels, self.branch.as_slice())
    }

    pub fn build_of<'a>(&self, labels: &'a BTreeMap<String, String>) -> &'a str {
        resolve_label(labels, self.build.as_slice())
    }

    pub fn context_of<'a>(&self, labels: &'a BTreeMap<String, String>) -> &'a str {
        resolve_label(labels, self.context.as_slice())
    }

    /// Check if an annotation may be copied onto an activity
    pub fn propagates_annotation(&self, key: &str) -> bool {
        !self.excluded_annotations.iter().any(|k| k == key)
    }
}
