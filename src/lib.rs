//! turbo-affected - affected packages and tasks for turborepo CI
//!
//! This library finds the turborepo packages affected by the current change,
//! derives which `turbo.json` tasks (and optional user-defined keys) they
//! affect, and publishes the result as CI step outputs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line parsing, pipeline wiring and output reporting
//! - [`core`] - Business logic (no process or CI I/O)
//! - [`infra`] - Infrastructure layer (filesystem, turbo processes, CI outputs)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
