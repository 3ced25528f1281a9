//! Configuration parsing and validation for fuelbot
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Polling, cooldown and refuel-window timing
//! - Replaceable fuel rules tables (hull bonuses, service fuel costs)
//! - Validation with clear error messages, collected before failing

mod rules;
mod schema;
mod settings;
mod validation;

pub use rules::*;
pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::warn;

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

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let settings = Settings::from_raw(raw);

    for service in settings.rules.ambiguous_services() {
        warn!(
            service = %service,
            "Service is defined in several categories; its fuel cost is counted once per category"
        );
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelbot_util::ItemTypeId;
    use std::io::Write;
    use std::time::Duration;

    const MINIMAL: &str = r#"
        config_version = 1

        [discord]
        channel_id = "1234"

        [esi]
        client_id = "client"
    "#;

    #[test]
    fn parse_minimal_config() {
        let settings = parse_config(MINIMAL).unwrap();
        assert_eq!(settings.discord.channel_id.as_str(), "1234");
        assert_eq!(settings.commodities.len(), 4);
        assert_eq!(settings.commodities[0].label, "[He]");
        assert!(settings.rules.structure_type(ItemTypeId::new(35832)).is_some());
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99

            [discord]
            channel_id = "1234"
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_duplicate_multiplier() {
        let config = r#"
            config_version = 1

            [discord]
            channel_id = "1234"

            [esi]
            client_id = "client"

            [[structure_types]]
            type_id = 35832
            name = "Astrahus"
            effects = [
                { category = "citadel", multiplier = 0.75 },
                { category = "citadel", multiplier = 0.5 },
            ]
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => {
                assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateEffect { .. })));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn validation_collects_every_error() {
        let config = r#"
            config_version = 1

            [bot]
            check_interval_seconds = 0
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => {
                assert!(errors.contains(&ValidationError::MissingChannel));
                assert!(errors.contains(&ValidationError::MissingClientId));
                assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroSetting { .. })));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{MINIMAL}").unwrap();
        writeln!(file, "[bot]\nrefuel_notification_seconds = 86400").unwrap();

        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.bot.refuel_window, Duration::from_secs(86_400));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
