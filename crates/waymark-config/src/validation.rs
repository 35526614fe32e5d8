//! Configuration validation

use crate::RawConfig;
use std::fmt;

/// A single validation failure, tagged with the offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a raw config, returning all problems found
pub fn validate_config(raw: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(ms) = raw.recorder.min_update_time_ms
        && ms == 0
    {
        errors.push(ValidationError::new(
            "recorder.min_update_time_ms",
            "must be positive",
        ));
    }

    if let Some(distance) = raw.recorder.min_update_distance
        && !(distance > 0.0)
    {
        errors.push(ValidationError::new(
            "recorder.min_update_distance",
            "must be positive",
        ));
    }

    if let Some(host) = &raw.gpsd.host
        && host.trim().is_empty()
    {
        errors.push(ValidationError::new("gpsd.host", "must not be empty"));
    }

    if let Some(port) = raw.gpsd.port
        && port == 0
    {
        errors.push(ValidationError::new("gpsd.port", "must be nonzero"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawDaemonConfig, RawGpsdConfig, RawRecorderConfig};

    fn raw() -> RawConfig {
        RawConfig {
            config_version: 1,
            recorder: RawRecorderConfig::default(),
            daemon: RawDaemonConfig::default(),
            gpsd: RawGpsdConfig::default(),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&raw()).is_empty());
    }

    #[test]
    fn negative_distance_rejected() {
        let mut config = raw();
        config.recorder.min_update_distance = Some(-1.0);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "recorder.min_update_distance");
    }

    #[test]
    fn nan_distance_rejected() {
        let mut config = raw();
        config.recorder.min_update_distance = Some(f64::NAN);

        assert_eq!(validate_config(&config).len(), 1);
    }

    #[test]
    fn multiple_errors_collected() {
        let mut config = raw();
        config.recorder.min_update_time_ms = Some(0);
        config.gpsd.host = Some("  ".into());
        config.gpsd.port = Some(0);

        assert_eq!(validate_config(&config).len(), 3);
    }
}
