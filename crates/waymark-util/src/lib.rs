//! Shared utilities for waymarkd
//!
//! This crate provides:
//! - Time helpers (wall-clock now, duration formatting)
//! - Default paths for config, data, and log directories

mod paths;
mod time;

pub use paths::*;
pub use time::*;
