//! Turbo process gateway
//!
//! Installs and version-checks the turbo binary and runs its queries.
//! All process execution for the affected computation lives here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Output;

use futures::future::try_join_all;
use tokio::process::Command;

use crate::config::defaults::{INSTALL_COMMAND, MIN_TURBO_MAJOR};
use crate::core::config::TaskName;
use crate::core::query::{parse_ls_affected, parse_task_packages, task_filter_query};
use crate::core::resolver::TaskPackageMap;
use crate::core::version::{check_minimum_major, parse_tool_version};
use crate::error::{ToolInstallError, ToolQueryError};

/// Handle to a turbo binary
#[derive(Debug, Clone)]
pub struct Turbo {
    /// Binary name or path; replaced by the absolute path once resolved
    binary: PathBuf,
    /// Working directory for every invocation
    cwd: Option<PathBuf>,
    /// Program and arguments run when the binary is missing
    install_command: Vec<String>,
}

impl Turbo {
    /// Create a handle for the given binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            cwd: None,
            install_command: INSTALL_COMMAND.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Run every invocation from `dir`
    ///
    /// The binary itself is still looked up relative to the process
    /// working directory.
    #[must_use]
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Replace the command used to install a missing binary
    #[must_use]
    pub fn with_install_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install_command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Get the binary this handle runs
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Make sure turbo is installed and new enough
    ///
    /// A missing binary is installed with npm; an existing one must report
    /// a major version of at least [`MIN_TURBO_MAJOR`]. On success the
    /// handle runs the resolved absolute path from then on.
    pub async fn ensure_available(&mut self) -> Result<(), ToolInstallError> {
        let Ok(resolved) = which::which(&self.binary) else {
            tracing::info!(
                "\"{}\" not found, installing turborepo",
                self.binary.display()
            );
            self.install().await?;
            self.binary = which::which(&self.binary).map_err(|_| {
                ToolInstallError::NotFoundAfterInstall {
                    binary: self.binary.display().to_string(),
                }
            })?;
            return Ok(());
        };

        tracing::debug!("Using turbo at {}", resolved.display());

        let version_err = |error: String| ToolInstallError::VersionCommand {
            binary: resolved.display().to_string(),
            error,
        };
        let output = self
            .command(&resolved)
            .arg("--version")
            .output()
            .await
            .map_err(|e| version_err(e.to_string()))?;
        if !output.status.success() {
            return Err(version_err(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let version = parse_tool_version(&String::from_utf8_lossy(&output.stdout))?;
        tracing::info!("turbo version {version}");
        check_minimum_major(&version, MIN_TURBO_MAJOR)?;

        self.binary = resolved;
        Ok(())
    }

    async fn install(&self) -> Result<(), ToolInstallError> {
        let command = self.install_command.join(" ");
        let install_err = |error: String| ToolInstallError::InstallFailed {
            command: command.clone(),
            error,
        };

        let (program, args) = self
            .install_command
            .split_first()
            .ok_or_else(|| install_err("empty install command".to_string()))?;
        let status = self
            .command(Path::new(program))
            .args(args)
            .status()
            .await
            .map_err(|e| install_err(e.to_string()))?;

        if !status.success() {
            return Err(install_err(format!("exited with {status}")));
        }
        Ok(())
    }

    /// Run turbo with `args` and return stdout if it exits successfully
    async fn run(&self, args: &[&str]) -> Result<String, ToolQueryError> {
        let invocation = self.describe(args);
        tracing::debug!("Running `{invocation}`");

        let output: Output = self
            .command(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ToolQueryError::Spawn {
                invocation: invocation.clone(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ToolQueryError::NonZeroExit {
                invocation,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.binary.display().to_string()];
        parts.extend(args.iter().map(|arg| {
            if arg.contains(' ') {
                format!("'{arg}'")
            } else {
                (*arg).to_string()
            }
        }));
        parts.join(" ")
    }

    /// List packages affected by the current change
    pub async fn query_affected_packages(&self) -> Result<BTreeSet<String>, ToolQueryError> {
        let args = ["ls", "--affected", "--output", "json"];
        let stdout = self.run(&args).await?;
        parse_ls_affected(&stdout).map_err(|error| ToolQueryError::Schema {
            invocation: self.describe(&args),
            error,
        })
    }

    /// List packages that define `task`, excluding the repo root
    pub async fn query_task_packages(&self, task: &str) -> Result<BTreeSet<String>, ToolQueryError> {
        let query = task_filter_query(task);
        let args = ["query", query.as_str()];
        let stdout = self.run(&args).await?;
        parse_task_packages(&stdout).map_err(|error| ToolQueryError::Schema {
            invocation: self.describe(&args),
            error,
        })
    }

    /// Query the packages of every task concurrently
    ///
    /// The first failing query fails the whole batch; remaining queries are
    /// dropped, which kills their processes.
    pub async fn query_all_task_packages<'a, I>(
        &self,
        tasks: I,
    ) -> Result<TaskPackageMap, ToolQueryError>
    where
        I: IntoIterator<Item = &'a TaskName>,
    {
        let queries = tasks.into_iter().map(|task| async move {
            let packages = self.query_task_packages(task).await?;
            tracing::debug!("Task '{task}' is defined by {} package(s)", packages.len());
            Ok::<_, ToolQueryError>((task.clone(), packages))
        });

        Ok(try_join_all(queries).await?.into_iter().collect())
    }
}
