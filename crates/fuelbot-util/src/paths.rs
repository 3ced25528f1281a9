//! Default paths for fuelbot components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/fuelbot/config.toml` or `~/.config/fuelbot/config.toml`
//! - Data (token file): `$XDG_DATA_HOME/fuelbot` or `~/.local/share/fuelbot`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const FUELBOT_DATA_DIR_ENV: &str = "FUELBOT_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "fuelbot";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/fuelbot/config.toml`
/// 2. `~/.config/fuelbot/config.toml`
/// 3. `./config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$FUELBOT_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/fuelbot` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/fuelbot` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(FUELBOT_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the FUELBOT_DATA_DIR env var.
/// Used for default values where the env var is checked separately (clap).
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
