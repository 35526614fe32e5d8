//! Core domain types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    Stopped,
    Running,
}

/// A single position fix handed over by a position source.
///
/// Provider-specific fields are optional; a source fills in what it knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,

    /// Altitude in meters above sea level
    pub altitude: Option<f64>,

    /// Ground speed in meters per second
    pub speed: Option<f64>,

    /// Course over ground in degrees from true north
    pub bearing: Option<f64>,

    /// Estimated horizontal position error in meters
    pub accuracy: Option<f64>,

    /// Fix timestamp
    pub time: DateTime<Local>,
}

impl PositionSample {
    /// A bare fix with only the mandatory fields set.
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Local>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            speed: None,
            bearing: None,
            accuracy: None,
            time,
        }
    }
}

/// Session metadata kept alongside the samples of an archive.
///
/// `count` is derived from the persisted samples and is cumulative across
/// resumed sessions. `end_time` is only ever set for non-empty sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub count: u64,
}

impl ArchiveMeta {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Recorded span, when both endpoints are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.signed_duration_since(start)),
            _ => None,
        }
    }
}
