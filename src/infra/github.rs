//! GitHub Actions output plumbing
//!
//! Step outputs are appended to the file named by `GITHUB_OUTPUT`. When that
//! variable is not set the legacy `::set-output` workflow command is printed
//! instead, which is also what you see when running locally. In JSON mode
//! stdout belongs to the result document, so without an output file the
//! outputs are only carried by that document.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Destination for named step outputs
pub trait OutputSink {
    /// Record one named output
    fn set_output(&self, name: &str, value: &str) -> Result<(), FilesystemError>;
}

/// Appends outputs to the `GITHUB_OUTPUT` file
#[derive(Debug, Clone)]
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for GithubOutputFile {
    fn set_output(&self, name: &str, value: &str) -> Result<(), FilesystemError> {
        filesystem::append_file(&self.path, &format_output_entry(name, value))
    }
}

/// Prints `::set-output` workflow commands to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutCommands;

impl OutputSink for StdoutCommands {
    fn set_output(&self, name: &str, value: &str) -> Result<(), FilesystemError> {
        println!("::set-output name={name}::{}", escape_command_data(value));
        Ok(())
    }
}

/// Keeps outputs in memory, in the order they were set
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: RefCell<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded outputs in order
    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.borrow().clone()
    }

    /// Last value recorded for `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.outputs
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

impl OutputSink for MemorySink {
    fn set_output(&self, name: &str, value: &str) -> Result<(), FilesystemError> {
        self.outputs
            .borrow_mut()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

/// Format one entry of the `GITHUB_OUTPUT` file
///
/// Single-line values use `name=value`. Multi-line values use the heredoc
/// form with a delimiter that does not occur in the value.
pub fn format_output_entry(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }

    let mut delimiter = String::from("ghadelimiter");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escape data for a workflow command
fn escape_command_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Whether we are running inside GitHub Actions
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Pick the sink for this run
///
/// An explicit output file wins. Otherwise workflow commands go to stdout,
/// unless `json` is set and stdout is reserved for the JSON result.
pub fn output_sink(output_file: Option<PathBuf>, json: bool) -> Box<dyn OutputSink> {
    match output_file {
        Some(path) if !path.as_os_str().is_empty() => Box::new(GithubOutputFile::new(path)),
        _ if json => Box::new(MemorySink::new()),
        _ => Box::new(StdoutCommands),
    }
}

/// Begin a collapsible log group
pub fn start_group(name: &str) {
    if in_github_actions() {
        println!("::group::{name}");
    }
}

/// End the current log group
pub fn end_group() {
    if in_github_actions() {
        println!("::endgroup::");
    }
}
