//! Output reporting
//!
//! Serializes a [`ResolverResult`] into step outputs and prints the
//! human-readable summary. No decisions are made here.
//!
//! Output names:
//! - `affected-packages` - JSON array of affected package names
//! - `affected-tasks` - JSON array of affected task names
//! - `task-results` - JSON object of every declared task to `true`/`false`
//! - `<task>_affected` - `"true"`/`"false"` per declared task
//! - `<key>_affected` - `"true"`/`"false"` per mapping key

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::defaults::{
    AFFECTED_SUFFIX, OUTPUT_AFFECTED_PACKAGES, OUTPUT_AFFECTED_TASKS, OUTPUT_TASK_RESULTS,
};
use serde::Serialize;

use crate::core::resolver::ResolverResult;
use crate::error::ReportError;
use crate::infra::github::{end_group, start_group, OutputSink};

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);

/// Global output settings
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress all output except errors
    pub quiet: bool,
    /// Print the result as JSON instead of log lines
    pub json: bool,
}

impl OutputConfig {
    /// Create output settings from CLI flags
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Make these settings visible to the print helpers
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
    }
}

/// Whether quiet mode is on
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Whether JSON mode is on
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Print an informational line unless quiet or JSON mode is on
pub fn print_info(message: &str) {
    if !is_quiet() && !is_json() {
        println!("{message}");
    }
}

/// Print an error to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", status::ERROR);
}

/// Normalize a task or key name into a valid output name
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, so `web#build` turns into
/// `web_build`.
pub fn normalize_output_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Name of the per-task or per-key boolean output
pub fn affected_output_name(name: &str) -> String {
    format!("{}{AFFECTED_SUFFIX}", normalize_output_name(name))
}

/// Whether log groups and summary lines are printed
fn prints_summary() -> bool {
    !is_quiet() && !is_json()
}

fn group(name: &str) {
    if prints_summary() {
        start_group(name);
    }
}

fn close_group() {
    if prints_summary() {
        end_group();
    }
}

fn to_json<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<String, ReportError> {
    serde_json::to_string(value).map_err(|e| ReportError::Serialize {
        name: name.to_string(),
        error: e.to_string(),
    })
}

fn to_pretty_json<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<String, ReportError> {
    serde_json::to_string_pretty(value).map_err(|e| ReportError::Serialize {
        name: name.to_string(),
        error: e.to_string(),
    })
}

fn bool_value(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Writes resolver results to an [`OutputSink`]
pub struct Reporter<'a> {
    sink: &'a dyn OutputSink,
    written: BTreeSet<String>,
}

impl<'a> Reporter<'a> {
    /// Create a reporter writing to `sink`
    pub fn new(sink: &'a dyn OutputSink) -> Self {
        Self {
            sink,
            written: BTreeSet::new(),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), ReportError> {
        if !self.written.insert(name.to_string()) {
            tracing::warn!("Output '{name}' was already set and will be overwritten");
        }
        Ok(self.sink.set_output(name, value)?)
    }

    /// Emit every output for `result` and print the summary
    pub fn report(&mut self, result: &ResolverResult) -> Result<(), ReportError> {
        let affected_packages: Vec<&String> = result.affected_packages.iter().collect();
        let affected_tasks: Vec<&String> = result.affected_tasks().collect();

        let packages_json = to_json(OUTPUT_AFFECTED_PACKAGES, &affected_packages)?;
        let tasks_json = to_json(OUTPUT_AFFECTED_TASKS, &affected_tasks)?;
        let results_json = to_json(OUTPUT_TASK_RESULTS, &result.tasks)?;

        group("Affected packages");
        if prints_summary() {
            let pretty = to_pretty_json(OUTPUT_AFFECTED_PACKAGES, &affected_packages)?;
            print_info(&format!("{OUTPUT_AFFECTED_PACKAGES}: {pretty}"));
        }
        self.set(OUTPUT_AFFECTED_PACKAGES, &packages_json)?;
        close_group();

        group("Affected tasks");
        if prints_summary() {
            let pretty = to_pretty_json(OUTPUT_AFFECTED_TASKS, &affected_tasks)?;
            print_info(&format!("{OUTPUT_AFFECTED_TASKS}: {pretty}"));
        }
        self.set(OUTPUT_AFFECTED_TASKS, &tasks_json)?;
        self.set(OUTPUT_TASK_RESULTS, &results_json)?;
        for (task, affected) in &result.tasks {
            self.set(&affected_output_name(task), bool_value(*affected))?;
        }
        close_group();

        if let Some(keys) = &result.keys {
            group("Affected packages or tasks");
            for (key, affected) in keys {
                let name = affected_output_name(key);
                print_info(&format!("{name}: {}", bool_value(*affected)));
                self.set(&name, bool_value(*affected))?;
            }
            close_group();
        }

        if is_json() && !is_quiet() {
            println!("{}", to_pretty_json("result", result)?);
        }

        Ok(())
    }
}

/// Status message prefixes
pub mod status {
    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}
