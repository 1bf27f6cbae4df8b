//! Linting of lighthouse trigger configs and in-repo Tekton pipelines
//!
//! A [`Linter`] walks `.lighthouse/<job>/triggers.yaml` files, parses each
//! trigger config, then resolves and validates every pipeline file a job
//! points at. Each file gets one entry in the [`LintReport`].

mod definition;
mod error;
mod linter;
mod report;
mod resolve;
mod trigger;
mod validate;

pub use definition::{PipelineRunDefinition, PipelineTaskDefinition, StepDefinition, USES_PREFIX};
pub use error::{FieldError, FieldErrors, LintError, RenderError, ResolveError};
pub use linter::{Linter, LIGHTHOUSE_DIR, TRIGGERS_FILE};
pub use report::{LintReport, LintTest, OutputFormat, ReportEntry};
pub use resolve::{RunDefinitionResolver, TektonResolver};
pub use trigger::{JobBase, Postsubmit, Presubmit, TriggerConfig, TriggerSpec, TEKTON_PIPELINE_AGENT};
pub use validate::{RunValidator, SchemaValidator};
