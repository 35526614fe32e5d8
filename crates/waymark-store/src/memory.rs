//! In-memory archive implementation for testing
//!
//! `MemoryOpener` retains archives after the recorder drops its handle, so a
//! resumed session sees the samples recorded before the interruption — the
//! same observable behavior as reopening a SQLite file.

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use waymark_api::{ArchiveMeta, PositionSample};

use crate::{Archive, ArchiveOpener, StoreError, StoreResult};

#[derive(Default)]
struct MemoryInner {
    samples: Vec<PositionSample>,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
}

/// In-memory archive
pub struct MemoryArchive {
    name: String,
    inner: Mutex<MemoryInner>,
    append_attempts: AtomicU64,

    /// Configure append to fail
    pub fail_append: Mutex<bool>,
}

impl MemoryArchive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(MemoryInner::default()),
            append_attempts: AtomicU64::new(0),
            fail_append: Mutex::new(false),
        }
    }

    /// Number of append calls so far, failed ones included
    pub fn append_attempts(&self) -> u64 {
        self.append_attempts.load(Ordering::SeqCst)
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, sample: &PositionSample) -> StoreResult<()> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        if *self.fail_append.lock().unwrap() {
            return Err(StoreError::Database("simulated append failure".into()));
        }
        self.inner.lock().unwrap().samples.push(sample.clone());
        Ok(())
    }

    fn meta(&self) -> StoreResult<ArchiveMeta> {
        let inner = self.inner.lock().unwrap();
        Ok(ArchiveMeta {
            start_time: inner.start_time,
            end_time: inner.end_time,
            count: inner.samples.len() as u64,
        })
    }

    fn set_start_time(&self, t: DateTime<Local>) -> StoreResult<()> {
        self.inner.lock().unwrap().start_time = Some(t);
        Ok(())
    }

    fn set_end_time(&self, t: DateTime<Local>) -> StoreResult<()> {
        self.inner.lock().unwrap().end_time = Some(t);
        Ok(())
    }

    fn last_sample(&self) -> StoreResult<Option<PositionSample>> {
        Ok(self.inner.lock().unwrap().samples.last().cloned())
    }

    fn samples(&self) -> StoreResult<Vec<PositionSample>> {
        Ok(self.inner.lock().unwrap().samples.clone())
    }

    fn close(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

/// In-memory opener for testing
pub struct MemoryOpener {
    archives: Mutex<HashMap<String, Arc<MemoryArchive>>>,
    open_count: AtomicU64,

    /// Configure open to fail
    pub fail_open: Mutex<bool>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self {
            archives: Mutex::new(HashMap::new()),
            open_count: AtomicU64::new(0),
            fail_open: Mutex::new(false),
        }
    }

    /// Number of successful open() calls so far
    pub fn opens(&self) -> u64 {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Direct access to a retained archive (for assertions)
    pub fn get(&self, name: &str) -> Option<Arc<MemoryArchive>> {
        self.archives.lock().unwrap().get(name).cloned()
    }
}

impl Default for MemoryOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveOpener for MemoryOpener {
    fn open(&self, name: &str) -> StoreResult<Arc<dyn Archive>> {
        if *self.fail_open.lock().unwrap() {
            return Err(StoreError::Database("simulated open failure".into()));
        }

        let mut archives = self.archives.lock().unwrap();
        let archive = archives
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryArchive::new(name)))
            .clone();

        self.open_count.fetch_add(1, Ordering::SeqCst);
        Ok(archive)
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        match self.archives.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no archive named {name}"),
            ))),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.archives.lock().unwrap().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopen_keeps_samples() {
        let opener = MemoryOpener::new();

        let archive = opener.open("t.trackdb").unwrap();
        archive
            .append(&PositionSample::new(1.0, 2.0, waymark_util::now()))
            .unwrap();
        drop(archive);

        let reopened = opener.open("t.trackdb").unwrap();
        assert_eq!(reopened.meta().unwrap().count, 1);
        assert_eq!(opener.opens(), 2);
    }

    #[test]
    fn delete_forgets_archive() {
        let opener = MemoryOpener::new();
        opener.open("t.trackdb").unwrap();

        assert!(opener.exists("t.trackdb"));
        opener.delete("t.trackdb").unwrap();
        assert!(!opener.exists("t.trackdb"));
        assert!(opener.delete("t.trackdb").is_err());
    }

    #[test]
    fn failed_append_counts_as_attempt_only() {
        let archive = MemoryArchive::new("t.trackdb");

        archive
            .append(&PositionSample::new(1.0, 2.0, waymark_util::now()))
            .unwrap();

        *archive.fail_append.lock().unwrap() = true;
        assert!(
            archive
                .append(&PositionSample::new(1.0, 2.0, waymark_util::now()))
                .is_err()
        );

        assert_eq!(archive.append_attempts(), 2);
        assert_eq!(archive.meta().unwrap().count, 1);
    }

    #[test]
    fn fail_open_switch() {
        let opener = MemoryOpener::new();
        *opener.fail_open.lock().unwrap() = true;

        assert!(opener.open("t.trackdb").is_err());
        assert_eq!(opener.opens(), 0);
    }
}
