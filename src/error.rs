//! Error types for turbo-affected
//!
//! Domain-specific error types using thiserror. Every variant names the
//! stage that failed so the message is enough to triage a CI log.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration reading errors
#[derive(Error, Debug)]
pub enum ConfigReadError {
    /// Config file could not be read
    #[error("Failed to read turbo config file: {0}")]
    Unreadable(#[from] FilesystemError),

    /// Config file is not valid JSON or has no `tasks` object
    #[error("Failed to parse turbo config file '{path}': {error}")]
    InvalidConfig { path: PathBuf, error: String },

    /// Mapping input is not a map of string to list of strings
    #[error("Failed to parse packages-or-tasks-yaml: {error}")]
    InvalidMapping { error: String },
}

/// Tool installation and version errors
#[derive(Error, Debug)]
pub enum ToolInstallError {
    /// Install command could not be started or exited non-zero
    #[error("Failed to install turbo with '{command}': {error}")]
    InstallFailed { command: String, error: String },

    /// Binary still not resolvable after installing
    #[error("'{binary}' not found on PATH after installing")]
    NotFoundAfterInstall { binary: String },

    /// `--version` invocation failed
    #[error("Failed to run '{binary} --version': {error}")]
    VersionCommand { binary: String, error: String },

    /// Version output is not a semantic version
    #[error("Failed to parse turbo version from '{output}'")]
    UnparseableVersion { output: String },

    /// Major version below the supported minimum
    #[error("turbo version {version} is not supported: major version must be at least {minimum}")]
    UnsupportedVersion { version: String, minimum: u64 },
}

/// Tool query errors
#[derive(Error, Debug)]
pub enum ToolQueryError {
    /// Process could not be spawned
    #[error("Failed to run `{invocation}`: {error}")]
    Spawn { invocation: String, error: String },

    /// Process exited non-zero
    #[error("`{invocation}` exited with {status}: {stderr}")]
    NonZeroExit {
        invocation: String,
        status: String,
        stderr: String,
    },

    /// Output does not match the expected schema
    #[error("Unexpected output from `{invocation}`: {error}")]
    Schema { invocation: String, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Step output reporting errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// Value could not be serialized to JSON
    #[error("Failed to serialize {name}: {error}")]
    Serialize { name: String, error: String },

    /// Output could not be written
    #[error(transparent)]
    Write(#[from] FilesystemError),
}

/// Top-level turbo-affected error type
#[derive(Error, Debug)]
pub enum AffectedError {
    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigReadError),

    /// Install error
    #[error("Install error: {0}")]
    Install(#[from] ToolInstallError),

    /// Query error
    #[error("Query error: {0}")]
    Query(#[from] ToolQueryError),
}
