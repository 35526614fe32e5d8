//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Recording behavior
    #[serde(default)]
    pub recorder: RawRecorderConfig,

    /// Daemon-level paths
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// gpsd endpoint
    #[serde(default)]
    pub gpsd: RawGpsdConfig,
}

/// Recording behavior settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRecorderConfig {
    /// Minimum time between accepted position updates, in milliseconds
    pub min_update_time_ms: Option<u64>,

    /// Minimum distance between accepted position updates, in meters
    pub min_update_distance: Option<f64>,

    /// Start recording as soon as the daemon comes up
    pub auto_start: Option<bool>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Directory holding archives and the resume marker
    pub data_dir: Option<PathBuf>,

    /// Log directory
    pub log_dir: Option<PathBuf>,
}

/// gpsd endpoint settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawGpsdConfig {
    /// gpsd host (default: 127.0.0.1)
    pub host: Option<String>,

    /// gpsd port (default: 2947)
    pub port: Option<u16>,
}
