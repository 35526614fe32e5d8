//! Shared domain types for waymarkd
//!
//! The bottom of the dependency graph: position samples as delivered by a
//! source, the per-archive session metadata, and the recorder state.

mod types;

pub use types::*;
