//! Archive trait definitions

use chrono::{DateTime, Local};
use std::sync::Arc;
use waymark_api::{ArchiveMeta, PositionSample};

use crate::StoreResult;

/// An open session archive.
///
/// At most one archive is open at a time system-wide; the recorder owns the
/// handle for the lifetime of a running session. Appends and reads may race
/// (interior synchronization), but appends themselves arrive serially.
pub trait Archive: Send + Sync {
    /// Name of the archive file this handle writes to
    fn name(&self) -> &str;

    /// Append one sample. The sample is durable once this returns.
    fn append(&self, sample: &PositionSample) -> StoreResult<()>;

    /// Current session metadata; `count` reflects all samples persisted so
    /// far, including those from before a resume.
    fn meta(&self) -> StoreResult<ArchiveMeta>;

    fn set_start_time(&self, t: DateTime<Local>) -> StoreResult<()>;

    fn set_end_time(&self, t: DateTime<Local>) -> StoreResult<()>;

    /// Most recent sample, if any
    fn last_sample(&self) -> StoreResult<Option<PositionSample>>;

    /// All samples in delivery order (read access for export consumers)
    fn samples(&self) -> StoreResult<Vec<PositionSample>>;

    /// Flush pending writes. The handle is released by dropping it.
    fn close(&self) -> StoreResult<()>;

    /// Check if the archive is healthy
    fn is_healthy(&self) -> bool;
}

/// Opens, deletes, and probes archives by name
pub trait ArchiveOpener: Send + Sync {
    /// Open an archive, creating it if it does not exist
    fn open(&self, name: &str) -> StoreResult<Arc<dyn Archive>>;

    /// Delete an archive. Callers close the handle first.
    fn delete(&self, name: &str) -> StoreResult<()>;

    fn exists(&self, name: &str) -> bool;
}
