//! Configuration parsing and validation for waymarkd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Recorder settings (update interval, update distance, auto-start)
//! - Daemon paths and gpsd endpoint
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.recorder.min_update_time, Duration::from_millis(5000));
        assert_eq!(settings.recorder.min_update_distance, 5.0);
        assert!(!settings.recorder.auto_start);
        assert_eq!(settings.gpsd.port, 2947);
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [recorder]
            min_update_time_ms = 1000
            min_update_distance = 2.5
            auto_start = true

            [daemon]
            data_dir = "/var/lib/waymark"

            [gpsd]
            host = "gps.local"
            port = 12947
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.recorder.min_update_time, Duration::from_millis(1000));
        assert_eq!(settings.recorder.min_update_distance, 2.5);
        assert!(settings.recorder.auto_start);
        assert_eq!(settings.daemon.data_dir.to_str().unwrap(), "/var/lib/waymark");
        assert_eq!(settings.gpsd.host, "gps.local");
        assert_eq!(settings.gpsd.port, 12947);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_zero_interval() {
        let config = r#"
            config_version = 1

            [recorder]
            min_update_time_ms = 0
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_version = 1\n").unwrap();

        let settings = load_config(&path).unwrap();
        assert!(!settings.recorder.auto_start);
    }
}
