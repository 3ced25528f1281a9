//! Fuel consumption calculator

use fuelbot_api::StructureSnapshot;
use fuelbot_config::FuelRules;

/// Fuel blocks per hour for the structure's online services.
///
/// Every category containing a service of the same name contributes, so a
/// name listed in two categories is charged twice. An unknown hull type gets
/// no bonuses.
pub fn hourly_fuel_cost(structure: &StructureSnapshot, rules: &FuelRules) -> f64 {
    let hull = rules.structure_type(structure.type_id);

    let mut total = 0.0;
    for service in structure.online_services() {
        for category in rules.categories() {
            for rule in category.services.iter().filter(|r| r.name == service.name) {
                let multiplier = hull.map_or(1.0, |h| h.multiplier_for(&category.category));
                total += f64::from(rule.fuel_per_hour) * multiplier;
            }
        }
    }
    total
}

/// Fuel blocks per day
pub fn daily_fuel_cost(structure: &StructureSnapshot, rules: &FuelRules) -> f64 {
    hourly_fuel_cost(structure, rules) * 24.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelbot_api::StructureService;
    use fuelbot_config::{RawService, RawServiceCategory};
    use fuelbot_util::{ItemTypeId, StructureId};

    fn structure(type_id: i32, services: &[(&str, &str)]) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(1),
            type_id: ItemTypeId::new(type_id),
            name: "Test".into(),
            fuel_expires: None,
            services: services
                .iter()
                .map(|(name, state)| StructureService::new(*name, *state))
                .collect(),
        }
    }

    #[test]
    fn astrahus_clone_bay() {
        let rules = FuelRules::reference();
        let s = structure(35832, &[("Clone Bay", "online")]);
        assert_eq!(daily_fuel_cost(&s, &rules), 180.0);
    }

    #[test]
    fn no_online_services_costs_nothing() {
        let rules = FuelRules::reference();
        assert_eq!(daily_fuel_cost(&structure(35832, &[]), &rules), 0.0);

        let offline = structure(35832, &[("Clone Bay", "offline"), ("Market", "Online")]);
        assert_eq!(daily_fuel_cost(&offline, &rules), 0.0);
    }

    #[test]
    fn unknown_type_has_no_bonus() {
        let rules = FuelRules::reference();
        let s = structure(1, &[("Clone Bay", "online")]);
        assert_eq!(daily_fuel_cost(&s, &rules), 240.0);
    }

    #[test]
    fn service_outside_hull_category_is_full_price() {
        let rules = FuelRules::reference();
        // Astrahus has no engineering bonus.
        let s = structure(35832, &[("Manufacturing (Standard)", "online"), ("Market", "online")]);
        assert_eq!(daily_fuel_cost(&s, &rules), 24.0 * (12.0 + 40.0 * 0.75));
    }

    #[test]
    fn athanor_uses_its_own_multipliers() {
        let rules = FuelRules::reference();
        let s = structure(35835, &[("Reprocessing", "online"), ("Moon Drilling", "online")]);
        let expected = 24.0 * (10.0 * 0.8 + 5.0);
        assert!((daily_fuel_cost(&s, &rules) - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_service_is_ignored() {
        let rules = FuelRules::reference();
        let s = structure(35832, &[("Standup Cloaking Device", "online")]);
        assert_eq!(hourly_fuel_cost(&s, &rules), 0.0);
    }

    #[test]
    fn service_in_two_categories_is_summed() {
        let category = |name: &str, fuel: u32| RawServiceCategory {
            category: name.into(),
            services: vec![RawService {
                name: "Market".into(),
                fuel_per_hour: fuel,
            }],
        };
        let rules = FuelRules::from_raw(vec![], vec![category("citadel", 40), category("trade", 20)]);
        let s = structure(35832, &[("Market", "online")]);
        assert_eq!(hourly_fuel_cost(&s, &rules), 60.0);
    }
}
