//! Fuel rules tables
//!
//! Two read-only lookups drive fuel consumption:
//! - structure type -> per-category fuel multipliers (hull bonuses)
//! - service category -> services and their base fuel cost per hour
//!
//! The reference tables below are used unless the config file replaces them.

use crate::schema::{RawCommodity, RawEffect, RawService, RawServiceCategory, RawStructureType};
use fuelbot_util::ItemTypeId;
use std::collections::{BTreeSet, HashMap};

/// Fuel multiplier applied to every service of one category
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub category: String,
    pub multiplier: f64,
}

/// Rule for one structure hull type
#[derive(Debug, Clone, PartialEq)]
pub struct StructureTypeRule {
    pub name: String,
    pub effects: Vec<Effect>,
}

impl StructureTypeRule {
    /// Multiplier for `category`, 1.0 when the hull has no bonus for it.
    /// If a category were listed twice the last one wins; validation rejects
    /// such tables.
    pub fn multiplier_for(&self, category: &str) -> f64 {
        self.effects
            .iter()
            .rev()
            .find(|e| e.category == category)
            .map_or(1.0, |e| e.multiplier)
    }
}

/// Base hourly fuel cost of a single service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRule {
    pub name: String,
    pub fuel_per_hour: u32,
}

/// All services of one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCategory {
    pub category: String,
    pub services: Vec<ServiceRule>,
}

/// Validated, immutable fuel rules
#[derive(Debug, Clone, Default)]
pub struct FuelRules {
    structure_types: HashMap<ItemTypeId, StructureTypeRule>,
    categories: Vec<ServiceCategory>,
}

impl FuelRules {
    /// Build from raw tables. Callers validate first (see `validate_rules`).
    pub fn from_raw(types: Vec<RawStructureType>, categories: Vec<RawServiceCategory>) -> Self {
        let structure_types = types
            .into_iter()
            .map(|t| {
                let rule = StructureTypeRule {
                    name: t.name,
                    effects: t
                        .effects
                        .into_iter()
                        .map(|e| Effect {
                            category: e.category,
                            multiplier: e.multiplier,
                        })
                        .collect(),
                };
                (ItemTypeId::new(t.type_id), rule)
            })
            .collect();

        let categories = categories
            .into_iter()
            .map(|c| ServiceCategory {
                category: c.category,
                services: c
                    .services
                    .into_iter()
                    .map(|s| ServiceRule {
                        name: s.name,
                        fuel_per_hour: s.fuel_per_hour,
                    })
                    .collect(),
            })
            .collect();

        Self {
            structure_types,
            categories,
        }
    }

    /// The built-in reference tables
    pub fn reference() -> Self {
        Self::from_raw(reference_structure_types(), reference_service_categories())
    }

    pub fn structure_type(&self, type_id: ItemTypeId) -> Option<&StructureTypeRule> {
        self.structure_types.get(&type_id)
    }

    /// Display name of a hull, or a placeholder naming the unknown id
    pub fn structure_type_name(&self, type_id: ItemTypeId) -> String {
        self.structure_type(type_id)
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| format!("unknown structure type ID: {}", type_id))
    }

    pub fn categories(&self) -> &[ServiceCategory] {
        &self.categories
    }

    pub fn structure_type_count(&self) -> usize {
        self.structure_types.len()
    }

    /// Service names defined in more than one category. Such services are
    /// charged once per matching category.
    pub fn ambiguous_services(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut ambiguous = BTreeSet::new();
        for category in &self.categories {
            // A name repeated inside one category is rejected by validation,
            // so dedupe per category before counting.
            let names: BTreeSet<&str> = category.services.iter().map(|s| s.name.as_str()).collect();
            for name in names {
                if !seen.insert(name) {
                    ambiguous.insert(name.to_string());
                }
            }
        }
        ambiguous.into_iter().collect()
    }
}

fn hull(type_id: i32, name: &str, effects: &[(&str, f64)]) -> RawStructureType {
    RawStructureType {
        type_id,
        name: name.to_string(),
        effects: effects
            .iter()
            .map(|(category, multiplier)| RawEffect {
                category: (*category).to_string(),
                multiplier: *multiplier,
            })
            .collect(),
    }
}

fn category(name: &str, services: &[(&str, u32)]) -> RawServiceCategory {
    RawServiceCategory {
        category: name.to_string(),
        services: services
            .iter()
            .map(|(service, fuel_per_hour)| RawService {
                name: (*service).to_string(),
                fuel_per_hour: *fuel_per_hour,
            })
            .collect(),
    }
}

/// Reference hull table
pub fn reference_structure_types() -> Vec<RawStructureType> {
    vec![
        hull(35832, "Astrahus", &[("citadel", 0.75)]),
        hull(35833, "Fortizar", &[("citadel", 0.75)]),
        hull(35834, "Keepstar", &[("citadel", 0.75)]),
        hull(35825, "Raitaru", &[("engineering", 0.75)]),
        hull(35826, "Azbel", &[("engineering", 0.75)]),
        hull(35827, "Sotiyo", &[("engineering", 0.75)]),
        hull(35835, "Athanor", &[("reaction", 0.8), ("reprocessing", 0.8)]),
        hull(35836, "Tatara", &[("reaction", 0.75), ("reprocessing", 0.75)]),
    ]
}

/// Reference service table
pub fn reference_service_categories() -> Vec<RawServiceCategory> {
    vec![
        category("citadel", &[("Clone Bay", 10), ("Market", 40)]),
        category(
            "engineering",
            &[
                // Blueprint copying, TE and ME research share one module.
                ("Blueprint Copying", 12),
                ("Invention", 12),
                ("Manufacturing (Standard)", 12),
                ("Manufacturing (Capital)", 24),
                ("Manufacturing (Supercapital)", 36),
            ],
        ),
        category(
            "reaction",
            &[
                ("Biochemical Reactions", 15),
                ("Composite Reactions", 15),
                ("Hybrid Reactions", 15),
            ],
        ),
        category("reprocessing", &[("Reprocessing", 10)]),
        category("resource processing", &[("Moon Drilling", 5)]),
    ]
}

/// Reference commodity list: the four racial fuel blocks
pub fn reference_commodities() -> Vec<RawCommodity> {
    [(4247, "[He]"), (4246, "[H]"), (4051, "[N]"), (4312, "[O]")]
        .into_iter()
        .map(|(type_id, label)| RawCommodity {
            type_id,
            label: label.to_string(),
        })
        .collect()
}
