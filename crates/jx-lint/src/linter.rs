//! Walks `.lighthouse` directories and lints every trigger config and the
//! pipeline files its jobs point at.
//!
//! Per-file failures are recorded in the report and the walk continues. Only
//! failing to read a directory aborts the run, including a missing top-level
//! `.lighthouse` directory when not walking recursively.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LintError;
use crate::report::{LintReport, LintTest};
use crate::resolve::{RunDefinitionResolver, TektonResolver};
use crate::trigger::TriggerConfig;
use crate::validate::{RunValidator, SchemaValidator};

/// Directory holding the lighthouse job configs of a repository
pub const LIGHTHOUSE_DIR: &str = ".lighthouse";

/// Trigger config file inside each job directory
pub const TRIGGERS_FILE: &str = "triggers.yaml";

pub struct Linter {
    resolver: Box<dyn RunDefinitionResolver>,
    validator: Box<dyn RunValidator>,
    recursive: bool,
}

impl Default for Linter {
    fn default() -> Self {
        Self {
            resolver: Box::new(TektonResolver),
            validator: Box::new(SchemaValidator),
            recursive: false,
        }
    }
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lint every `.lighthouse` directory below the root, not just the top one
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn RunDefinitionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn RunValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Lint the repository rooted at `root`
    pub fn lint(&self, root: &Path) -> Result<LintReport, LintError> {
        let mut report = LintReport::default();

        if !self.recursive {
            return self.lint_dir(&root.join(LIGHTHOUSE_DIR));
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(|source| LintError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() && entry.file_name() == LIGHTHOUSE_DIR {
                report.extend(self.lint_dir(entry.path())?);
            }
        }
        Ok(report)
    }

    /// Lint each `<dir>/<job>/triggers.yaml` in job-name order
    pub fn lint_dir(&self, dir: &Path) -> Result<LintReport, LintError> {
        let read_dir_err = |source| LintError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut jobs = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            jobs.push((name, entry.path()));
        }
        jobs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut report = LintReport::default();
        for (name, job_dir) in jobs {
            let triggers = job_dir.join(TRIGGERS_FILE);
            if !triggers.is_file() {
                tracing::debug!(job = %name, "no triggers file, skipping");
                continue;
            }
            self.lint_triggers(&triggers, &job_dir, &mut report);
        }
        Ok(report)
    }

    fn lint_triggers(&self, triggers: &Path, job_dir: &Path, report: &mut LintReport) {
        tracing::debug!(file = %triggers.display(), "linting trigger config");
        let mut config = match TriggerConfig::from_file(triggers) {
            Ok(config) => config,
            Err(e) => {
                report.push(LintTest::failed(triggers.to_path_buf(), e));
                return;
            }
        };

        let problems = config.problems();
        if problems.is_empty() {
            report.push(LintTest::ok(triggers.to_path_buf()));
        } else {
            report.push(LintTest::failed(
                triggers.to_path_buf(),
                LintError::Trigger {
                    path: triggers.to_path_buf(),
                    problems,
                },
            ));
        }

        config.apply_defaults();

        let sources: Vec<PathBuf> = config
            .jobs()
            .filter(|job| !job.source_path.is_empty())
            .map(|job| job_dir.join(&job.source_path))
            .collect();
        for source in sources {
            let test = match self.lint_source(&source) {
                Ok(()) => LintTest::ok(source),
                Err(e) => LintTest::failed(source, e),
            };
            report.push(test);
        }
    }

    /// Read, resolve and validate one pipeline file
    pub fn lint_source(&self, path: &Path) -> Result<(), LintError> {
        tracing::debug!(file = %path.display(), "linting pipeline");
        let data = fs::read_to_string(path).map_err(|source| LintError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if data.is_empty() {
            return Err(LintError::Empty(path.to_path_buf()));
        }

        let definition = self
            .resolver
            .resolve(&data, path)
            .map_err(|source| LintError::Resolve {
                path: path.to_path_buf(),
                source,
            })?;

        self.validator
            .validate(&definition)
            .map_err(|source| LintError::Validation {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PipelineRunDefinition;
    use crate::error::{FieldError, FieldErrors, ResolveError};
    use tempfile::TempDir;

    const PR_PIPELINE: &str = r#"
kind: PipelineRun
metadata:
  name: pullrequest
spec:
  pipelineSpec:
    tasks:
    - name: from-build-pack
      taskSpec:
        steps:
        - name: build-make
          image: golang:1.22
          script: make test
"#;

    fn write(path: &Path, data: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn triggers(source: &str) -> String {
        format!(
            "spec:\n  presubmits:\n  - name: pr\n    context: pr\n    source: {}\n",
            source
        )
    }

    #[test]
    fn test_valid_tree() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(&job.join(TRIGGERS_FILE), &triggers("pullrequest.yaml"));
        write(&job.join("pullrequest.yaml"), PR_PIPELINE);

        let report = Linter::new().lint(dir.path()).unwrap();
        assert_eq!(report.tests.len(), 2);
        assert!(report.passed());
        assert_eq!(report.tests[1].file, job.join("pullrequest.yaml"));
    }

    #[test]
    fn test_missing_and_empty_sources_recorded() {
        let dir = TempDir::new().unwrap();
        let lighthouse = dir.path().join(LIGHTHOUSE_DIR);
        write(&lighthouse.join("a/triggers.yaml"), &triggers("missing.yaml"));
        write(&lighthouse.join("b/triggers.yaml"), &triggers("empty.yaml"));
        write(&lighthouse.join("b/empty.yaml"), "");

        let report = Linter::new().lint(dir.path()).unwrap();
        assert_eq!(report.tests.len(), 4);
        assert_eq!(report.failed_count(), 2);
        assert!(matches!(report.tests[1].error, Some(LintError::Read { .. })));
        assert!(matches!(report.tests[3].error, Some(LintError::Empty(_))));
    }

    #[test]
    fn test_bad_triggers_continue_with_next_job() {
        let dir = TempDir::new().unwrap();
        let lighthouse = dir.path().join(LIGHTHOUSE_DIR);
        write(&lighthouse.join("a/triggers.yaml"), "spec: [not, a, map");
        write(&lighthouse.join("b/triggers.yaml"), &triggers("pr.yaml"));
        write(&lighthouse.join("b/pr.yaml"), PR_PIPELINE);
        // skipped: hidden, plain file, no triggers
        write(&lighthouse.join(".hidden/triggers.yaml"), "spec: [");
        write(&lighthouse.join("README.md"), "docs");
        fs::create_dir_all(lighthouse.join("c")).unwrap();

        let report = Linter::new().lint(dir.path()).unwrap();
        assert_eq!(report.tests.len(), 3);
        assert!(matches!(report.tests[0].error, Some(LintError::Parse { .. })));
        assert!(report.tests[1].passed());
        assert!(report.tests[2].passed());
    }

    #[test]
    fn test_trigger_problems_do_not_stop_source_checks() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(
            &job.join(TRIGGERS_FILE),
            "spec:\n  postsubmits:\n  - name: release\n    source: release.yaml\n    branches: ['[main']\n",
        );
        write(&job.join("release.yaml"), PR_PIPELINE);

        let report = Linter::new().lint(dir.path()).unwrap();
        assert_eq!(report.tests.len(), 2);
        assert!(matches!(report.tests[0].error, Some(LintError::Trigger { .. })));
        assert!(report.tests[1].passed());
    }

    #[test]
    fn test_validation_failure() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(&job.join(TRIGGERS_FILE), &triggers("pr.yaml"));
        write(
            &job.join("pr.yaml"),
            "kind: Pipeline\nspec:\n  tasks:\n  - name: build\n    taskSpec:\n      steps:\n      - name: make\n",
        );

        let report = Linter::new().lint(dir.path()).unwrap();
        let err = report.tests[1].error.as_ref().unwrap();
        assert!(matches!(err, LintError::Validation { .. }));
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn test_recursive_finds_nested_lighthouse_dirs() {
        let dir = TempDir::new().unwrap();
        for repo in ["repo-b", "repo-a"] {
            let job = dir.path().join(repo).join(".lighthouse/jenkins-x");
            write(&job.join(TRIGGERS_FILE), &triggers("pr.yaml"));
            write(&job.join("pr.yaml"), PR_PIPELINE);
        }

        assert!(matches!(
            Linter::new().lint(dir.path()),
            Err(LintError::ReadDir { .. })
        ));

        let report = Linter::new().recursive(true).lint(dir.path()).unwrap();
        assert_eq!(report.tests.len(), 4);
        assert!(report.tests[0].file.starts_with(dir.path().join("repo-a")));
        assert!(report.tests[2].file.starts_with(dir.path().join("repo-b")));
    }

    #[test]
    fn test_missing_lighthouse_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Linter::new().lint(dir.path()).unwrap_err();
        match err {
            LintError::ReadDir { path, .. } => assert_eq!(path, dir.path().join(LIGHTHOUSE_DIR)),
            other => panic!("expected ReadDir, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_source_is_not_empty() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(&job.join(TRIGGERS_FILE), &triggers("blank.yaml"));
        write(&job.join("blank.yaml"), "  \n");

        let report = Linter::new().lint(dir.path()).unwrap();
        let err = report.tests[1].error.as_ref().unwrap();
        assert!(!matches!(err, LintError::Empty(_)));
        assert!(matches!(err, LintError::Resolve { .. }));
    }

    /// Rejects every definition with a single field error
    struct RejectAll;

    impl RunValidator for RejectAll {
        fn validate(&self, _definition: &PipelineRunDefinition) -> Result<(), FieldErrors> {
            let mut errors = FieldErrors::default();
            errors.push(FieldError::new("rejected", "spec"));
            Err(errors)
        }
    }

    #[test]
    fn test_custom_validator_failure_recorded() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(&job.join(TRIGGERS_FILE), &triggers("pr.yaml"));
        write(&job.join("pr.yaml"), PR_PIPELINE);

        let report = Linter::new()
            .with_validator(Box::new(RejectAll))
            .lint(dir.path())
            .unwrap();
        assert_eq!(report.failed_count(), 1);
        match report.tests[1].error.as_ref() {
            Some(LintError::Validation { source, .. }) => assert_eq!(source.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    /// Resolves any content to a fixed, task-less definition
    struct Fixed;

    impl RunDefinitionResolver for Fixed {
        fn resolve(&self, _data: &str, path: &Path) -> Result<PipelineRunDefinition, ResolveError> {
            if path.extension().is_some_and(|ext| ext == "yml") {
                return Err(ResolveError::UnsupportedKind("Secret".to_string()));
            }
            Ok(PipelineRunDefinition {
                name: "fixed".to_string(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_custom_resolver_feeds_validator() {
        let dir = TempDir::new().unwrap();
        let job = dir.path().join(".lighthouse/jenkins-x");
        write(&job.join("pr.yaml"), "not: a pipeline");
        write(&job.join("secret.yml"), "kind: Secret");

        let linter = Linter::new().with_resolver(Box::new(Fixed));
        // the schema validator rejects the task-less definition
        let err = linter.lint_source(&job.join("pr.yaml")).unwrap_err();
        assert!(err.to_string().contains("tasks"));

        let err = linter.lint_source(&job.join("secret.yml")).unwrap_err();
        assert!(matches!(
            err,
            LintError::Resolve {
                source: ResolveError::UnsupportedKind(_),
                ..
            }
        ));
    }
}

