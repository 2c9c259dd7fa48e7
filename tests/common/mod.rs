//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test monorepo context
///
/// Creates a temporary directory holding a `turbo.json`, a fake `turbo`
/// script and the `GITHUB_OUTPUT` file the binary writes to.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Create an executable fake `turbo` script and return its path
    #[cfg(unix)]
    pub fn create_fake_turbo(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join("bin").join("turbo");
        self.create_file("bin/turbo", &format!("#!/bin/sh\n{body}\n"));
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake turbo executable");
        path
    }

    /// Parse the `name=value` lines of the output file
    pub fn read_outputs(&self) -> Vec<(String, String)> {
        let content = std::fs::read_to_string(self.dir.path().join("github_output"))
            .expect("Failed to read output file");
        content
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Last value of an output
    pub fn output(&self, name: &str) -> Option<String> {
        self.read_outputs()
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Build a turbo-affected command for the project with the given fake turbo
    pub fn command(&self, turbo: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_turbo-affected"));
        cmd.current_dir(self.path())
            .env_remove("INPUT_TURBO-CONFIG-FILE")
            .env_remove("INPUT_PACKAGES-OR-TASKS-YAML")
            .env_remove("GITHUB_ACTIONS")
            .env("TURBO_AFFECTED_BIN", turbo)
            .env("GITHUB_OUTPUT", self.path().join("github_output"));
        for arg in args {
            cmd.arg(arg);
        }
        cmd
    }

    /// Run turbo-affected in the project with the given fake turbo
    pub fn run(&self, turbo: &Path, args: &[&str]) -> Output {
        self.command(turbo, args)
            .output()
            .expect("Failed to execute turbo-affected")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample turbo.json for testing
#[allow(dead_code)]
pub const SAMPLE_TURBO_JSON: &str = r#"{
  "$schema": "https://turbo.build/schema.json",
  "tasks": {
    "build": { "dependsOn": ["^build"], "outputs": ["dist/**"] },
    "test": { "dependsOn": ["build"] },
    "web#lint": {}
  }
}"#;

/// Fake turbo: `pkg-a` is affected, `build` is defined by `pkg-a` and
/// `pkg-b`, `test` only by `pkg-b`, `web#lint` only by the root
#[allow(dead_code)]
pub const SAMPLE_FAKE_TURBO: &str = r#"
case "$1" in
  --version) echo "2.3.1" ;;
  ls) echo '{"packageManager":"pnpm","packages":{"count":1,"items":[{"name":"pkg-a","path":"packages/a"}]}}' ;;
  query)
    case "$2" in
      *'"build"'*) echo '{"data":{"packages":{"items":[{"name":"//","path":""},{"name":"pkg-a","path":"packages/a"},{"name":"pkg-b","path":"packages/b"}]}}}' ;;
      *'"test"'*) echo '{"data":{"packages":{"items":[{"name":"pkg-b","path":"packages/b"}]}}}' ;;
      *) echo '{"data":{"packages":{"items":[{"name":"//","path":""}]}}}' ;;
    esac ;;
  *) echo "unexpected: $*" >&2; exit 1 ;;
esac"#;
