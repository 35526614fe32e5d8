//! Archive naming and the durable last-opened marker
//!
//! The marker file is written when an archive is opened and removed when a
//! session stops cleanly. A marker that survives until the next start means
//! the previous session never completed, and its archive is resumed instead
//! of fragmenting the track across a second file.

use std::fs;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

use crate::StoreResult;

/// Marker filename inside the data directory
const LAST_OPENED_MARKER: &str = "last-opened";

/// Archive filename extension
const ARCHIVE_EXT: &str = "trackdb";

/// Computes archive names and tracks the currently open archive across
/// process restarts.
pub struct ArchiveNamer {
    data_dir: PathBuf,
}

impl ArchiveNamer {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn marker_path(&self) -> PathBuf {
        self.data_dir.join(LAST_OPENED_MARKER)
    }

    /// Mint a fresh archive name. The timestamp keeps names sortable and
    /// human-readable; the uuid tag makes them unique even within a second.
    pub fn new_archive_name(&self) -> String {
        let stamp = waymark_util::now().format("%Y%m%d-%H%M%S");
        let tag = Uuid::new_v4().simple().to_string();
        format!("{}-{}.{}", stamp, &tag[..8], ARCHIVE_EXT)
    }

    /// Whether a prior session left an archive open
    pub fn has_resumable(&self) -> bool {
        self.resumable_name().is_some()
    }

    /// Name of the archive a prior session left open, if any
    pub fn resumable_name(&self) -> Option<String> {
        match fs::read_to_string(self.marker_path()) {
            Ok(content) => {
                let name = content.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "Failed to read last-opened marker");
                None
            }
        }
    }

    /// Durably record the currently open archive name
    pub fn set_last_opened(&self, name: &str) -> StoreResult<()> {
        fs::write(self.marker_path(), name)?;
        Ok(())
    }

    /// Forget the currently open archive name (clean stop)
    pub fn clear_last_opened(&self) -> StoreResult<()> {
        match fs::remove_file(self.marker_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_names_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let namer = ArchiveNamer::new(dir.path());

        let a = namer.new_archive_name();
        let b = namer.new_archive_name();
        assert_ne!(a, b);
        assert!(a.ends_with(".trackdb"));
    }

    #[test]
    fn marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let namer = ArchiveNamer::new(dir.path());

        assert!(!namer.has_resumable());

        namer.set_last_opened("20260823-101500-abcd1234.trackdb").unwrap();
        assert!(namer.has_resumable());
        assert_eq!(
            namer.resumable_name().unwrap(),
            "20260823-101500-abcd1234.trackdb"
        );

        namer.clear_last_opened().unwrap();
        assert!(!namer.has_resumable());
        assert!(namer.resumable_name().is_none());
    }

    #[test]
    fn marker_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();

        ArchiveNamer::new(dir.path())
            .set_last_opened("a.trackdb")
            .unwrap();

        // A fresh namer over the same directory sees the marker, like a
        // process restart would.
        let namer = ArchiveNamer::new(dir.path());
        assert_eq!(namer.resumable_name().unwrap(), "a.trackdb");
    }

    #[test]
    fn clearing_missing_marker_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let namer = ArchiveNamer::new(dir.path());
        namer.clear_last_opened().unwrap();
    }
}
