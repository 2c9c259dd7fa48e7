//! Config reader
//!
//! Loads the declared task names from `turbo.json` and the optional
//! key-to-dependencies mapping supplied as YAML.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigReadError;
use crate::infra::filesystem;

/// Task name declared in the build-graph configuration
pub type TaskName = String;

/// Mapping of a user-defined key to the package or task names it depends on
pub type KeyDependencyMap = BTreeMap<String, Vec<String>>;

/// The part of `turbo.json` this tool cares about
#[derive(Debug, Deserialize)]
struct TurboConfig {
    /// Task definitions; the values are never examined
    tasks: serde_json::Map<String, serde_json::Value>,
}

/// Load the set of task names declared in a turbo config file
pub fn load_declared_tasks(path: &Path) -> Result<BTreeSet<TaskName>, ConfigReadError> {
    let content = filesystem::read_file(path)?;
    parse_declared_tasks(&content).map_err(|error| ConfigReadError::InvalidConfig {
        path: path.to_path_buf(),
        error,
    })
}

/// Parse task names out of turbo config JSON
fn parse_declared_tasks(content: &str) -> Result<BTreeSet<TaskName>, String> {
    let config: TurboConfig = serde_json::from_str(content).map_err(|e| e.to_string())?;
    Ok(config.tasks.into_iter().map(|(name, _)| name).collect())
}

/// Parse the optional packages-or-tasks mapping
///
/// Blank input means the feature is not configured and yields `None`.
pub fn parse_key_dependency_map(raw: &str) -> Result<Option<KeyDependencyMap>, ConfigReadError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    serde_yaml::from_str::<KeyDependencyMap>(raw)
        .map(Some)
        .map_err(|e| ConfigReadError::InvalidMapping {
            error: e.to_string(),
        })
}
