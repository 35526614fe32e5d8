//! Position source interfaces for waymarkd
//!
//! A position source delivers fixes asynchronously over a channel; the
//! recorder subscribes at start and unsubscribes at stop. Closing the
//! channel is the unsubscribe guarantee: once the receiver drains, no
//! further sample can be observed.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;

use thiserror::Error;

/// Errors from position source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),

    #[error("Not subscribed")]
    NotSubscribed,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;
