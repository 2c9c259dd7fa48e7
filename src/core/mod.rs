//! Core business logic module
//!
//! This module contains the affected-set logic.
//! It has NO process or CI I/O - those belong in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`config`] - turbo.json task discovery and the key mapping input
//! - [`query`] - turbo query construction and response validation
//! - [`resolver`] - Task and key affectedness
//! - [`version`] - turbo version checks

pub mod config;
pub mod query;
pub mod resolver;
pub mod version;
