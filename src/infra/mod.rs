//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, CI outputs and external processes.
//! This module is the only place where side effects occur.

pub mod filesystem;
pub mod github;
pub mod turbo;
