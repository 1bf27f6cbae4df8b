//! jx-pipeline CLI
//!
//! Entry point for the `jx-pipeline` command-line tool.

use clap::{Parser, Subcommand};
use jx_activity::{MergeMode, Reconciler};
use jx_lint::OutputFormat;
use jx_pipeline::commands::{
    get_activity, list_activities, load_config, reconcile_run, run_lint, set_override,
    LintOptions,
};
use jx_pipeline::config::EffectiveConfig;
use jx_pipeline::logging::init_logging;
use jx_pipeline::{CliError, FileActivityStore};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;

/// Exit code when a command could not run
const EXIT_ERROR: i32 = 2;

/// Exit code when linting found failing files
const EXIT_LINT_FAILED: i32 = 1;

#[derive(Parser)]
#[command(name = "jx-pipeline")]
#[command(about = "Pipeline activity reconciler and lighthouse config linter", version)]
struct Cli {
    /// Path to config file (default: .jx/pipeline.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Activity store directory (default: .jx/activities)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint lighthouse trigger configs and the pipelines they reference
    Lint {
        /// Repository root containing .lighthouse
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,

        /// Lint every .lighthouse directory below the root
        #[arg(long, short = 'r')]
        recursive: bool,

        /// Report format: text, json or yaml
        #[arg(long, short = 'o')]
        format: Option<OutputFormat>,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Pipeline activity records
    Activity {
        #[command(subcommand)]
        action: ActivityCommands,
    },

    /// Print the effective configuration with its sources
    Config,
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Fold a pipeline run snapshot (JSON) into its activity record
    Reconcile {
        /// Path to the pipeline run snapshot
        #[arg(long)]
        run: PathBuf,

        /// Replace existing stages instead of preserving them
        #[arg(long)]
        overwrite_steps: bool,
    },

    /// Print one activity record as JSON
    Get {
        name: String,
    },

    /// List stored activities
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_json) {
        eprintln!("Error initializing logging: {}", e);
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let mut overrides = json!({});
    if let Some(store) = &cli.store {
        set_override(
            &mut overrides,
            "store.dir",
            Value::String(store.to_string_lossy().to_string()),
        );
    }
    if let Commands::Lint {
        recursive, format, ..
    } = &cli.command
    {
        if *recursive {
            set_override(&mut overrides, "lint.recursive", Value::Bool(true));
        }
        if let Some(format) = format {
            set_override(&mut overrides, "lint.format", Value::String(format.to_string()));
        }
    }

    let config = load_config(cli.config.as_deref(), overrides)?;

    match cli.command {
        Commands::Lint { dir, out, .. } => run_lint_command(&config, dir, out),
        Commands::Activity { action } => run_activity(&config, action),
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(0)
        }
    }
}

fn run_lint_command(
    config: &EffectiveConfig,
    dir: PathBuf,
    out: Option<PathBuf>,
) -> Result<i32, CliError> {
    let settings = config.settings()?;
    let options = LintOptions {
        dir,
        recursive: settings.lint.recursive,
        format: settings.lint.format,
        out,
    };
    let report = run_lint(&options)?;
    Ok(if report.passed() { 0 } else { EXIT_LINT_FAILED })
}

fn run_activity(config: &EffectiveConfig, action: ActivityCommands) -> Result<i32, CliError> {
    let settings = config.settings()?;
    let store = FileActivityStore::new(settings.store.dir.clone());

    match action {
        ActivityCommands::Reconcile {
            run,
            overwrite_steps,
        } => {
            let mode = if overwrite_steps {
                MergeMode::Overwrite
            } else {
                MergeMode::Preserve
            };
            let reconciler = Reconciler::new(settings.labels.clone());
            if let Some(reconciled) = reconcile_run(&store, &reconciler, &run, mode)? {
                println!("{}", reconciled.name);
            }
        }
        ActivityCommands::Get { name } => {
            let activity = get_activity(&store, &settings.labels, &name)?;
            println!("{}", serde_json::to_string_pretty(&activity)?);
        }
        ActivityCommands::List { json } => {
            let rows = list_activities(&store, &settings.labels)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No activities in {}", store.dir().display());
            } else {
                println!("{:<48} {:<10} {:>6} {:>6}", "NAME", "STATUS", "BUILD", "STEPS");
                for row in rows {
                    println!(
                        "{:<48} {:<10} {:>6} {:>6}",
                        row.name, row.status, row.build, row.steps
                    );
                }
            }
        }
    }
    Ok(0)
}
