//! Default configuration values

/// Default build-graph configuration file
pub const DEFAULT_TURBO_CONFIG_FILE: &str = "turbo.json";

/// Default turbo binary name
pub const DEFAULT_TURBO_BIN: &str = "turbo";

/// Minimum supported turbo major version
pub const MIN_TURBO_MAJOR: u64 = 2;

/// Package name turbo uses for the monorepo root
pub const ROOT_PACKAGE: &str = "//";

/// Program and arguments used to install turbo when it is missing
pub const INSTALL_COMMAND: &[&str] = &["npm", "install", "-g", "turbo@latest"];

/// Suffix of per-task and per-key outputs
pub const AFFECTED_SUFFIX: &str = "_affected";

/// Output holding the JSON array of affected packages
pub const OUTPUT_AFFECTED_PACKAGES: &str = "affected-packages";

/// Output holding the JSON array of affected tasks
pub const OUTPUT_AFFECTED_TASKS: &str = "affected-tasks";

/// Output holding the JSON object of every task result
pub const OUTPUT_TASK_RESULTS: &str = "task-results";
