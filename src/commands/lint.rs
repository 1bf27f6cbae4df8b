//! `jx-pipeline lint`

use jx_lint::{LintReport, Linter, OutputFormat};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use super::CliError;

#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Repository root holding `.lighthouse`
    pub dir: PathBuf,
    pub recursive: bool,
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    pub out: Option<PathBuf>,
}

/// Lint the tree and emit the report; the caller decides the exit code
pub fn run_lint(options: &LintOptions) -> Result<LintReport, CliError> {
    let report = Linter::new()
        .recursive(options.recursive)
        .lint(&options.dir)?;
    let rendered = report.render(options.format)?;

    match &options.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| CliError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(path, rendered).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
        }
        None => {
            io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|source| CliError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }

    tracing::info!(
        files = report.tests.len(),
        failed = report.failed_count(),
        "lint finished"
    );
    Ok(report)
}
