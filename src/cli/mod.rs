//! Command-line interface module
//!
//! This module handles argument parsing, wires the pipeline together and
//! formats output. The decisions themselves live in [`crate::core`].
//!
//! Every option can also be supplied through the environment variable GitHub
//! Actions sets for the matching action input.

pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::defaults::{DEFAULT_TURBO_BIN, DEFAULT_TURBO_CONFIG_FILE};
use crate::core::config::{load_declared_tasks, parse_key_dependency_map};
use crate::core::resolver::{resolve, ResolverResult};
use crate::error::AffectedError;
use crate::infra::github::output_sink;
use crate::infra::turbo::Turbo;

use output::Reporter;

/// turbo-affected - find turborepo packages and tasks affected by a change
///
/// Publishes the affected packages, one `<task>_affected` flag per task in
/// turbo.json and optional `<key>_affected` flags as step outputs.
#[derive(Parser, Debug)]
#[command(name = "turbo-affected")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the turbo config file
    #[arg(long, env = "INPUT_TURBO-CONFIG-FILE", default_value = DEFAULT_TURBO_CONFIG_FILE)]
    pub turbo_config_file: PathBuf,

    /// YAML mapping of output keys to package or task names
    #[arg(long, env = "INPUT_PACKAGES-OR-TASKS-YAML", default_value = "")]
    pub packages_or_tasks_yaml: String,

    /// turbo binary to run
    #[arg(long, env = "TURBO_AFFECTED_BIN", default_value = DEFAULT_TURBO_BIN)]
    pub turbo_bin: PathBuf,

    /// Directory to run turbo in
    #[arg(short = 'C', long)]
    pub working_directory: Option<PathBuf>,

    /// File step outputs are appended to (defaults to `::set-output` on stdout)
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Also print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Run the pipeline and publish the outputs
    pub async fn run(self) -> Result<()> {
        let result = self.compute().await?;

        let sink = output_sink(self.github_output.clone(), self.json);
        Reporter::new(sink.as_ref())
            .report(&result)
            .context("Failed to write step outputs")?;

        Ok(())
    }

    /// Run every fallible stage and resolve affectedness
    ///
    /// Nothing is published until all stages have succeeded.
    pub async fn compute(&self) -> Result<ResolverResult, AffectedError> {
        let config_path = match &self.working_directory {
            Some(dir) if self.turbo_config_file.is_relative() => dir.join(&self.turbo_config_file),
            _ => self.turbo_config_file.clone(),
        };

        let tasks = load_declared_tasks(&config_path)?;
        tracing::info!(
            "Found {} task(s) in {}",
            tasks.len(),
            config_path.display()
        );
        let key_deps = parse_key_dependency_map(&self.packages_or_tasks_yaml)?;

        let mut turbo = Turbo::new(&self.turbo_bin);
        if let Some(dir) = &self.working_directory {
            turbo = turbo.with_cwd(dir);
        }

        turbo.ensure_available().await?;
        tracing::debug!("Using turbo binary {}", turbo.binary().display());

        let affected_packages = turbo.query_affected_packages().await?;
        tracing::info!("{} affected package(s)", affected_packages.len());

        let task_packages = turbo.query_all_task_packages(&tasks).await?;

        Ok(resolve(
            &tasks,
            &affected_packages,
            &task_packages,
            key_deps.as_ref(),
        ))
    }

    /// Log filter directive matching `--verbose`
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}
