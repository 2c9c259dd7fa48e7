//! Turbo query protocol
//!
//! Builds the task-filter query and validates the JSON turbo prints back.
//! Every response shape has its own validate-or-fail function so nothing
//! downstream ever sees partially-checked data.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::config::defaults::ROOT_PACKAGE;

/// A package record as reported by turbo
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageItem {
    /// Package name
    pub name: String,
    /// Package path relative to the repo root (informational)
    pub path: String,
}

/// List of package records
#[derive(Debug, Deserialize)]
pub struct PackageList {
    /// Package records
    pub items: Vec<PackageItem>,
}

/// Output of `turbo ls --affected --output json`
#[derive(Debug, Deserialize)]
pub struct LsAffectedOutput {
    /// Affected packages
    pub packages: PackageList,
}

/// Output of `turbo query <graphql>`
#[derive(Debug, Deserialize)]
pub struct QueryPackagesOutput {
    /// GraphQL data envelope
    pub data: QueryData,
}

/// `data` field of a query response
#[derive(Debug, Deserialize)]
pub struct QueryData {
    /// Matching packages
    pub packages: PackageList,
}

/// Validate `turbo ls --affected` output and project out package names
pub fn parse_ls_affected(stdout: &str) -> Result<BTreeSet<String>, String> {
    let output: LsAffectedOutput = serde_json::from_str(stdout).map_err(|e| e.to_string())?;
    Ok(output
        .packages
        .items
        .into_iter()
        .map(|item| item.name)
        .collect())
}

/// Validate `turbo query` output and project out package names, root excluded
pub fn parse_task_packages(stdout: &str) -> Result<BTreeSet<String>, String> {
    let output: QueryPackagesOutput = serde_json::from_str(stdout).map_err(|e| e.to_string())?;
    Ok(strip_root(output.data.packages.items))
}

/// Drop the root pseudo-package and keep the names
pub fn strip_root(items: Vec<PackageItem>) -> BTreeSet<String> {
    items
        .into_iter()
        .filter(|item| item.name != ROOT_PACKAGE)
        .map(|item| item.name)
        .collect()
}

/// Build the GraphQL query selecting packages that define `task`
pub fn task_filter_query(task: &str) -> String {
    format!(
        "query {{ packages(filter: {{ has: {{ field: TASK_NAME, value: \"{}\" }} }}) {{ items {{ name path }} }} }}",
        escape_graphql_string(task)
    )
}

/// Escape a value for use inside a GraphQL string literal
pub fn escape_graphql_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0C}' => escaped.push_str("\\f"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped
}
