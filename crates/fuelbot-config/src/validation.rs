//! Configuration validation

use crate::rules::{reference_commodities, reference_service_categories, reference_structure_types};
use crate::schema::{RawBotConfig, RawCommodity, RawConfig, RawServiceCategory, RawStructureType};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Setting '{setting}' must be greater than zero")]
    ZeroSetting { setting: &'static str },

    #[error("discord.channel_id must not be empty")]
    MissingChannel,

    #[error("esi.client_id must not be empty")]
    MissingClientId,

    #[error("Duplicate structure type ID: {0}")]
    DuplicateStructureType(i32),

    #[error("Structure type {type_id}: category '{category}' has more than one multiplier")]
    DuplicateEffect { type_id: i32, category: String },

    #[error("Structure type {type_id}: multiplier {multiplier} for '{category}' must be in (0, 1]")]
    InvalidMultiplier {
        type_id: i32,
        category: String,
        multiplier: f64,
    },

    #[error("Duplicate service category: {0}")]
    DuplicateCategory(String),

    #[error("Category '{category}': service '{service}' is defined more than once")]
    DuplicateService { category: String, service: String },

    #[error("Duplicate commodity type ID: {0}")]
    DuplicateCommodity(i32),
}

/// Validate a raw configuration, including the effective rules tables
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_bot(&config.bot);

    if config.discord.channel_id.trim().is_empty() {
        errors.push(ValidationError::MissingChannel);
    }

    if config.esi.client_id.trim().is_empty() {
        errors.push(ValidationError::MissingClientId);
    }

    let types = config
        .structure_types
        .clone()
        .unwrap_or_else(reference_structure_types);
    let categories = config
        .service_categories
        .clone()
        .unwrap_or_else(reference_service_categories);
    errors.extend(validate_rules(&types, &categories));

    let commodities = config
        .commodities
        .clone()
        .unwrap_or_else(reference_commodities);
    errors.extend(validate_commodities(&commodities));

    errors
}

fn validate_bot(bot: &RawBotConfig) -> Vec<ValidationError> {
    let settings = [
        ("bot.check_interval_seconds", bot.check_interval_seconds),
        ("bot.notify_interval_seconds", bot.notify_interval_seconds),
        ("bot.refuel_notification_seconds", bot.refuel_notification_seconds),
        ("bot.request_timeout_seconds", bot.request_timeout_seconds),
        ("bot.price_window_days", bot.price_window_days.map(u64::from)),
        ("bot.command_poll_seconds", bot.command_poll_seconds),
    ];

    settings
        .into_iter()
        .filter(|(_, value)| *value == Some(0))
        .map(|(setting, _)| ValidationError::ZeroSetting { setting })
        .collect()
}

/// Validate the structure-type and service-category tables
pub fn validate_rules(
    types: &[RawStructureType],
    categories: &[RawServiceCategory],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_types = HashSet::new();
    for structure_type in types {
        if !seen_types.insert(structure_type.type_id) {
            errors.push(ValidationError::DuplicateStructureType(structure_type.type_id));
        }

        let mut seen_effects = HashSet::new();
        for effect in &structure_type.effects {
            if !seen_effects.insert(effect.category.as_str()) {
                errors.push(ValidationError::DuplicateEffect {
                    type_id: structure_type.type_id,
                    category: effect.category.clone(),
                });
            }

            // NaN fails both comparisons and is rejected too.
            if !(effect.multiplier > 0.0 && effect.multiplier <= 1.0) {
                errors.push(ValidationError::InvalidMultiplier {
                    type_id: structure_type.type_id,
                    category: effect.category.clone(),
                    multiplier: effect.multiplier,
                });
            }
        }
    }

    let mut seen_categories = HashSet::new();
    for category in categories {
        if !seen_categories.insert(category.category.as_str()) {
            errors.push(ValidationError::DuplicateCategory(category.category.clone()));
        }

        let mut seen_services = HashSet::new();
        for service in &category.services {
            if !seen_services.insert(service.name.as_str()) {
                errors.push(ValidationError::DuplicateService {
                    category: category.category.clone(),
                    service: service.name.clone(),
                });
            }
        }
    }

    errors
}

fn validate_commodities(commodities: &[RawCommodity]) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    commodities
        .iter()
        .filter(|c| !seen.insert(c.type_id))
        .map(|c| ValidationError::DuplicateCommodity(c.type_id))
        .collect()
}
