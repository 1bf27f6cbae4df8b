//! Lint results and their rendering

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LintError, RenderError};

/// Outcome of linting one file
#[derive(Debug)]
pub struct LintTest {
    pub file: PathBuf,
    pub error: Option<LintError>,
}

impl LintTest {
    pub fn ok(file: PathBuf) -> Self {
        Self { file, error: None }
    }

    pub fn failed(file: PathBuf, error: LintError) -> Self {
        Self {
            file,
            error: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// All results of a lint run, in the order files were visited
#[derive(Debug, Default)]
pub struct LintReport {
    pub tests: Vec<LintTest>,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!(
                "unknown output format {:?}, expected text, json or yaml",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Yaml => "yaml",
        };
        write!(f, "{}", s)
    }
}

/// Serialized form of one result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub file: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LintReport {
    pub fn push(&mut self, test: LintTest) {
        self.tests.push(test);
    }

    pub fn extend(&mut self, other: LintReport) {
        self.tests.extend(other.tests);
    }

    pub fn failed_count(&self) -> usize {
        self.tests.iter().filter(|t| !t.passed()).count()
    }

    /// True when no file failed
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.tests
            .iter()
            .map(|t| ReportEntry {
                file: t.file.display().to_string(),
                ok: t.passed(),
                error: t.error.as_ref().map(ToString::to_string),
            })
            .collect()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, RenderError> {
        match format {
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(&self.entries())?;
                out.push('\n');
                Ok(out)
            }
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&self.entries())?),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        for test in &self.tests {
            match &test.error {
                None => out.push_str(&format!("OK   {}\n", test.file.display())),
                Some(e) => out.push_str(&format!("FAIL {}: {}\n", test.file.display(), e)),
            }
        }
        out.push_str(&format!(
            "{} file(s) linted, {} failed\n",
            self.tests.len(),
            self.failed_count()
        ));
        out
    }
}
