//! Recording session engine for waymarkd
//!
//! This crate is the heart of waymarkd, containing:
//! - The recorder state machine (Stopped <-> Running)
//! - Archive selection on start (resume an interrupted session, or mint a
//!   fresh archive)
//! - Session finalization on stop (end-time stamping, empty-session cleanup)
//! - User-facing notifications for session outcomes

mod notify;
mod recorder;

pub use notify::*;
pub use recorder::*;

use thiserror::Error;
use waymark_source::SourceError;
use waymark_store::StoreError;

/// Errors from the recording engine
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Position source error: {0}")]
    Source(#[from] SourceError),
}

pub type CoreResult<T> = Result<T, CoreError>;
