//! Resolved settings (validated config with defaults applied)

use crate::RawConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default minimum time between accepted updates
pub const DEFAULT_MIN_UPDATE_TIME: Duration = Duration::from_millis(5000);

/// Default minimum distance between accepted updates, in meters
pub const DEFAULT_MIN_UPDATE_DISTANCE: f64 = 5.0;

/// Default gpsd endpoint
pub const DEFAULT_GPSD_HOST: &str = "127.0.0.1";
pub const DEFAULT_GPSD_PORT: u16 = 2947;

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub recorder: RecorderSettings,
    pub daemon: DaemonSettings,
    pub gpsd: GpsdSettings,
}

/// Recording behavior
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    pub min_update_time: Duration,
    pub min_update_distance: f64,
    pub auto_start: bool,
}

/// Daemon paths
#[derive(Debug, Clone)]
pub struct DaemonSettings {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

/// gpsd endpoint
#[derive(Debug, Clone)]
pub struct GpsdSettings {
    pub host: String,
    pub port: u16,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            min_update_time: DEFAULT_MIN_UPDATE_TIME,
            min_update_distance: DEFAULT_MIN_UPDATE_DISTANCE,
            auto_start: false,
        }
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            data_dir: waymark_util::data_dir_without_env(),
            log_dir: waymark_util::default_log_dir(),
        }
    }
}

impl Default for GpsdSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_GPSD_HOST.into(),
            port: DEFAULT_GPSD_PORT,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recorder: RecorderSettings::default(),
            daemon: DaemonSettings::default(),
            gpsd: GpsdSettings::default(),
        }
    }
}

impl Settings {
    /// Convert a validated raw config, filling in defaults
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = Settings::default();

        Self {
            recorder: RecorderSettings {
                min_update_time: raw
                    .recorder
                    .min_update_time_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.recorder.min_update_time),
                min_update_distance: raw
                    .recorder
                    .min_update_distance
                    .unwrap_or(defaults.recorder.min_update_distance),
                auto_start: raw.recorder.auto_start.unwrap_or(false),
            },
            daemon: DaemonSettings {
                data_dir: raw.daemon.data_dir.unwrap_or(defaults.daemon.data_dir),
                log_dir: raw.daemon.log_dir.unwrap_or(defaults.daemon.log_dir),
            },
            gpsd: GpsdSettings {
                host: raw.gpsd.host.unwrap_or(defaults.gpsd.host),
                port: raw.gpsd.port.unwrap_or(defaults.gpsd.port),
            },
        }
    }
}
