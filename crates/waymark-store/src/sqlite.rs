//! SQLite-backed archive implementation
//!
//! One database file per recording session. Samples are stored append-only;
//! rowid order is delivery order. Metadata lives in a small key/value table
//! so `count` can always be derived from the samples themselves.

use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use waymark_api::{ArchiveMeta, PositionSample};

use crate::{Archive, ArchiveOpener, StoreError, StoreResult};

const META_START_TIME: &str = "start_time";
const META_END_TIME: &str = "end_time";

/// SQLite-backed archive
pub struct SqliteArchive {
    name: String,
    conn: Mutex<Connection>,
}

impl SqliteArchive {
    /// Open or create an archive at the given path
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let archive = Self {
            name: name.into(),
            conn: Mutex::new(conn),
        };
        archive.init_schema()?;
        Ok(archive)
    }

    /// Create an in-memory archive (for testing)
    pub fn in_memory(name: impl Into<String>) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let archive = Self {
            name: name.into(),
            conn: Mutex::new(conn),
        };
        archive.init_schema()?;
        Ok(archive)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Position samples (append-only, rowid order = delivery order)
            CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                altitude REAL,
                speed REAL,
                bearing REAL,
                accuracy REAL,
                time TEXT NOT NULL
            );

            -- Session metadata
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        debug!(archive = %self.name, "Archive schema initialized");
        Ok(())
    }

    fn set_meta_time(&self, key: &str, t: DateTime<Local>) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO meta (key, value)
            VALUES (?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value
            "#,
            params![key, t.to_rfc3339()],
        )?;
        Ok(())
    }
}

fn parse_time(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {s:?}: {e}")))
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<PositionSample> {
    let time_str: String = row.get(6)?;
    let time = DateTime::parse_from_rfc3339(&time_str)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(PositionSample {
        latitude: row.get(0)?,
        longitude: row.get(1)?,
        altitude: row.get(2)?,
        speed: row.get(3)?,
        bearing: row.get(4)?,
        accuracy: row.get(5)?,
        time,
    })
}

const SAMPLE_COLUMNS: &str = "latitude, longitude, altitude, speed, bearing, accuracy, time";

impl Archive for SqliteArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, sample: &PositionSample) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO samples (latitude, longitude, altitude, speed, bearing, accuracy, time)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                sample.latitude,
                sample.longitude,
                sample.altitude,
                sample.speed,
                sample.bearing,
                sample.accuracy,
                sample.time.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn meta(&self) -> StoreResult<ArchiveMeta> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;

        let get_time = |key: &str| -> StoreResult<Option<DateTime<Local>>> {
            let value: Option<String> = conn
                .query_row("SELECT value FROM meta WHERE key = ?", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            value.as_deref().map(parse_time).transpose()
        };

        Ok(ArchiveMeta {
            start_time: get_time(META_START_TIME)?,
            end_time: get_time(META_END_TIME)?,
            count: count as u64,
        })
    }

    fn set_start_time(&self, t: DateTime<Local>) -> StoreResult<()> {
        self.set_meta_time(META_START_TIME, t)
    }

    fn set_end_time(&self, t: DateTime<Local>) -> StoreResult<()> {
        self.set_meta_time(META_END_TIME, t)
    }

    fn last_sample(&self) -> StoreResult<Option<PositionSample>> {
        let conn = self.conn.lock().unwrap();

        let sample = conn
            .query_row(
                &format!("SELECT {SAMPLE_COLUMNS} FROM samples ORDER BY id DESC LIMIT 1"),
                [],
                sample_from_row,
            )
            .optional()?;

        Ok(sample)
    }

    fn samples(&self) -> StoreResult<Vec<PositionSample>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare(&format!("SELECT {SAMPLE_COLUMNS} FROM samples ORDER BY id ASC"))?;
        let rows = stmt.query_map([], sample_from_row)?;

        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }

        Ok(samples)
    }

    fn close(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.cache_flush()?;
        debug!(archive = %self.name, "Archive flushed");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!(archive = %self.name, "Archive lock poisoned");
                false
            }
        }
    }
}

/// Opens SQLite archives inside a data directory
pub struct SqliteOpener {
    data_dir: PathBuf,
}

impl SqliteOpener {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

impl ArchiveOpener for SqliteOpener {
    fn open(&self, name: &str) -> StoreResult<Arc<dyn Archive>> {
        let archive = SqliteArchive::open(self.path_for(name), name)?;
        Ok(Arc::new(archive))
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        std::fs::remove_file(self.path_for(name))?;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }
}
