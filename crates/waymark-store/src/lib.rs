//! Archive persistence for waymarkd
//!
//! Provides:
//! - The `Archive` and `ArchiveOpener` traits (one open archive per session)
//! - SQLite-backed implementation (one file per session)
//! - In-memory implementation for tests
//! - Archive naming and the durable last-opened marker for resumption

mod memory;
mod naming;
mod sqlite;
mod traits;

pub use memory::*;
pub use naming::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt archive data: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
