//! Turbo version checking
//!
//! Parses the output of `turbo --version` and enforces the minimum
//! supported major version.

use regex::Regex;
use semver::Version;

use crate::error::ToolInstallError;

/// Parse the version printed by `turbo --version`
///
/// The whole trimmed output must be one semantic version, optionally
/// prefixed with `v`.
///
/// # Examples
/// ```
/// use turbo_affected::core::version::parse_tool_version;
///
/// let version = parse_tool_version("2.1.3\n").unwrap();
/// assert_eq!(version.major, 2);
/// ```
pub fn parse_tool_version(output: &str) -> Result<Version, ToolInstallError> {
    let unparseable = || ToolInstallError::UnparseableVersion {
        output: output.trim().to_string(),
    };

    let version_regex =
        Regex::new(r"^v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)$")
            .map_err(|_| unparseable())?;
    let candidate = version_regex
        .captures(output.trim())
        .and_then(|caps| caps.get(1))
        .ok_or_else(unparseable)?;

    Version::parse(candidate.as_str()).map_err(|_| unparseable())
}

/// Fail unless `version` has at least the given major version
pub fn check_minimum_major(version: &Version, minimum: u64) -> Result<(), ToolInstallError> {
    if version.major < minimum {
        return Err(ToolInstallError::UnsupportedVersion {
            version: version.to_string(),
            minimum,
        });
    }
    Ok(())
}
