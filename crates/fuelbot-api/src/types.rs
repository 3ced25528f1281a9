//! Shared types for structures and market data

use chrono::{DateTime, NaiveDate, Utc};
use fuelbot_util::{ItemTypeId, StructureId};
use serde::{Deserialize, Serialize};

/// State string for a service that is burning fuel
pub const SERVICE_STATE_ONLINE: &str = "online";

/// A service fitted to a structure, as reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureService {
    pub name: String,
    pub state: String,
}

impl StructureService {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }

    /// Only services in exactly the `online` state consume fuel.
    /// The comparison is case-sensitive.
    pub fn is_online(&self) -> bool {
        self.state == SERVICE_STATE_ONLINE
    }
}

/// One observation of a monitored structure at poll time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub id: StructureId,
    pub type_id: ItemTypeId,
    pub name: String,
    /// `None` means unfuelled or unknown: no countdown is computed for it.
    pub fuel_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub services: Vec<StructureService>,
}

impl StructureSnapshot {
    /// Services currently burning fuel, in reported order
    pub fn online_services(&self) -> impl Iterator<Item = &StructureService> {
        self.services.iter().filter(|s| s.is_online())
    }

    /// Time left until the fuel runs out, negative once expired.
    /// `None` for an unfuelled structure.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.fuel_expires.map(|expires| expires.signed_duration_since(now))
    }
}

/// One day of market history for a commodity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub date: NaiveDate,
    pub average: f64,
}

/// A fuel commodity tracked by the price estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    pub type_id: ItemTypeId,
    /// Short display label, e.g. `[He]`
    pub label: String,
}

impl Commodity {
    pub fn new(type_id: impl Into<ItemTypeId>, label: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            label: label.into(),
        }
    }
}
