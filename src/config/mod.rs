//! Configuration constants
//!
//! - [`defaults`] - Default values, tool constants and output names

pub mod defaults;
