//! Default paths for waymarkd components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/waymark/config.toml` or `~/.config/waymark/config.toml`
//! - Data (archives): `$XDG_DATA_HOME/waymark` or `~/.local/share/waymark`
//! - Logs: `$XDG_STATE_HOME/waymark` or `~/.local/state/waymark`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const WAYMARK_DATA_DIR_ENV: &str = "WAYMARK_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "waymark";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/waymark/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/waymark/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Get the default data directory (where archives and the resume marker
/// live), without checking the WAYMARK_DATA_DIR env var; the daemon's CLI
/// handles the env var itself.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default log directory.
pub fn default_log_dir() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_waymark() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("waymark"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn data_dir_contains_waymark() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("waymark"));
    }

    #[test]
    fn log_dir_contains_waymark() {
        let path = default_log_dir();
        assert!(path.to_string_lossy().contains("waymark"));
    }
}
