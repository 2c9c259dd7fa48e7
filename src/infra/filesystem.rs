//! Filesystem operations
//!
//! Handles file reads and appends.

use std::io::Write;
use std::path::Path;

use crate::error::FilesystemError;

/// Append content to a file, creating it if missing
pub fn append_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    let write_err = |e: std::io::Error| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
