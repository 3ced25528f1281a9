//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Polling and notification timing
    #[serde(default)]
    pub bot: RawBotConfig,

    /// Chat channel settings
    #[serde(default)]
    pub discord: RawDiscordConfig,

    /// Remote data source settings
    #[serde(default)]
    pub esi: RawEsiConfig,

    /// Fuel commodities to price (default: the four racial fuel blocks)
    pub commodities: Option<Vec<RawCommodity>>,

    /// Structure hull rules (default: reference table)
    pub structure_types: Option<Vec<RawStructureType>>,

    /// Service fuel costs by category (default: reference table)
    pub service_categories: Option<Vec<RawServiceCategory>>,
}

/// Timing settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBotConfig {
    /// How often structures are polled (default: 1 hour)
    pub check_interval_seconds: Option<u64>,

    /// Minimum time between repeated alerts for one structure (default: 12 hours)
    pub notify_interval_seconds: Option<u64>,

    /// How far ahead of fuel expiry alerts start (default: 5 days)
    pub refuel_notification_seconds: Option<u64>,

    /// Bound on every remote call (default: 10 seconds)
    pub request_timeout_seconds: Option<u64>,

    /// Number of most recent market days averaged (default: 7)
    pub price_window_days: Option<u32>,

    /// How often command channels are scanned (default: 5 seconds)
    pub command_poll_seconds: Option<u64>,
}

/// Chat channel settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDiscordConfig {
    /// Channel receiving low-fuel alerts
    #[serde(default)]
    pub channel_id: String,

    /// Channels scanned for commands (default: `channel_id` only)
    pub command_channels: Option<Vec<String>>,
}

/// Remote data source settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawEsiConfig {
    /// SSO application client id
    #[serde(default)]
    pub client_id: String,

    /// Token file, relative paths resolve against the data directory
    pub auth_file: Option<PathBuf>,

    /// Market region used for price history (default: The Forge)
    pub market_region_id: Option<i32>,
}

/// Commodity entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCommodity {
    pub type_id: i32,
    pub label: String,
}

/// Structure hull rule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStructureType {
    pub type_id: i32,
    pub name: String,
    #[serde(default)]
    pub effects: Vec<RawEffect>,
}

/// Fuel reduction applied to one service category
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawEffect {
    pub category: String,
    pub multiplier: f64,
}

/// Services of one category and their base hourly fuel cost
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawServiceCategory {
    pub category: String,
    #[serde(default)]
    pub services: Vec<RawService>,
}

/// A single service rule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawService {
    pub name: String,
    pub fuel_per_hour: u32,
}
