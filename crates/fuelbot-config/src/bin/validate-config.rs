//! Config validation CLI tool
//!
//! Validates a fuelbot configuration file and reports any errors.

use fuelbot_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a fuelbot configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match fuelbot_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", fuelbot_config::CURRENT_CONFIG_VERSION);
            println!("  Alert channel: {}", settings.discord.channel_id);
            println!("  Check interval: {}", format_duration(settings.bot.check_interval));
            println!("  Notify interval: {}", format_duration(settings.bot.notify_interval));
            println!("  Refuel window: {}", format_duration(settings.bot.refuel_window));
            println!("  Structure types: {}", settings.rules.structure_type_count());
            println!("  Service categories: {}", settings.rules.categories().len());

            if !settings.commodities.is_empty() {
                println!();
                println!("Commodities:");
                for commodity in &settings.commodities {
                    println!("  - {} ({})", commodity.label, commodity.type_id);
                }
            }

            let ambiguous = settings.rules.ambiguous_services();
            if !ambiguous.is_empty() {
                println!();
                println!("Warning: services listed in several categories (cost counted per category):");
                for service in ambiguous {
                    println!("  - {}", service);
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                fuelbot_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                fuelbot_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                fuelbot_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                fuelbot_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        fuelbot_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
