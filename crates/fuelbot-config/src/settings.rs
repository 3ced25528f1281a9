//! Validated settings

use crate::rules::{
    FuelRules, reference_commodities, reference_service_categories, reference_structure_types,
};
use crate::schema::{RawBotConfig, RawConfig, RawDiscordConfig, RawEsiConfig};
use fuelbot_api::Commodity;
use fuelbot_util::{ChannelId, ItemTypeId};
use std::path::PathBuf;
use std::time::Duration;

/// Default market region: The Forge (Jita)
pub const DEFAULT_MARKET_REGION_ID: i32 = 10000002;

/// Default token file name inside the data directory
pub const DEFAULT_AUTH_FILE: &str = "auth.json";

/// Validated settings ready for use by the daemon
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot: BotSettings,
    pub discord: DiscordSettings,
    pub esi: EsiSettings,
    /// Commodities to price, in display order
    pub commodities: Vec<Commodity>,
    pub rules: FuelRules,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let rules = FuelRules::from_raw(
            raw.structure_types.unwrap_or_else(reference_structure_types),
            raw.service_categories
                .unwrap_or_else(reference_service_categories),
        );

        let commodities = raw
            .commodities
            .unwrap_or_else(reference_commodities)
            .into_iter()
            .map(|c| Commodity::new(ItemTypeId::new(c.type_id), c.label))
            .collect();

        Self {
            bot: BotSettings::from_raw(raw.bot),
            discord: DiscordSettings::from_raw(raw.discord),
            esi: EsiSettings::from_raw(raw.esi),
            commodities,
            rules,
        }
    }
}

/// Polling and notification timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub check_interval: Duration,
    /// Cooldown between repeated alerts for one structure
    pub notify_interval: Duration,
    /// Lead time before expiry during which alerts are sent
    pub refuel_window: Duration,
    pub request_timeout: Duration,
    pub price_window_days: usize,
    pub command_poll_interval: Duration,
}

impl BotSettings {
    fn from_raw(raw: RawBotConfig) -> Self {
        let defaults = Self::default();
        Self {
            check_interval: raw
                .check_interval_seconds
                .map_or(defaults.check_interval, Duration::from_secs),
            notify_interval: raw
                .notify_interval_seconds
                .map_or(defaults.notify_interval, Duration::from_secs),
            refuel_window: raw
                .refuel_notification_seconds
                .map_or(defaults.refuel_window, Duration::from_secs),
            request_timeout: raw
                .request_timeout_seconds
                .map_or(defaults.request_timeout, Duration::from_secs),
            price_window_days: raw
                .price_window_days
                .map_or(defaults.price_window_days, |d| d as usize),
            command_poll_interval: raw
                .command_poll_seconds
                .map_or(defaults.command_poll_interval, Duration::from_secs),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(3600),
            notify_interval: Duration::from_secs(12 * 3600),
            refuel_window: Duration::from_secs(5 * 24 * 3600),
            request_timeout: Duration::from_secs(10),
            price_window_days: 7,
            command_poll_interval: Duration::from_secs(5),
        }
    }
}

/// Chat channel settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordSettings {
    pub channel_id: ChannelId,
    pub command_channels: Vec<ChannelId>,
}

impl DiscordSettings {
    fn from_raw(raw: RawDiscordConfig) -> Self {
        let channel_id = ChannelId::new(raw.channel_id);
        let command_channels = raw
            .command_channels
            .map(|channels| channels.into_iter().map(ChannelId::new).collect())
            .unwrap_or_else(|| vec![channel_id.clone()]);

        Self {
            channel_id,
            command_channels,
        }
    }
}

/// Remote data source settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsiSettings {
    pub client_id: String,
    pub auth_file: PathBuf,
    pub market_region_id: i32,
}

impl EsiSettings {
    fn from_raw(raw: RawEsiConfig) -> Self {
        Self {
            client_id: raw.client_id,
            auth_file: raw
                .auth_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AUTH_FILE)),
            market_region_id: raw.market_region_id.unwrap_or(DEFAULT_MARKET_REGION_ID),
        }
    }

    /// Token file location, resolving relative paths against `data_dir`
    pub fn auth_file_in(&self, data_dir: &std::path::Path) -> PathBuf {
        if self.auth_file.is_absolute() {
            self.auth_file.clone()
        } else {
            data_dir.join(&self.auth_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn bot_defaults_match_reference_timing() {
        let bot = BotSettings::from_raw(RawBotConfig::default());
        assert_eq!(bot.check_interval, Duration::from_secs(3600));
        assert_eq!(bot.notify_interval, Duration::from_secs(43_200));
        assert_eq!(bot.refuel_window, Duration::from_secs(432_000));
        assert_eq!(bot.price_window_days, 7);
    }

    #[test]
    fn command_channels_default_to_alert_channel() {
        let discord = DiscordSettings::from_raw(RawDiscordConfig {
            channel_id: "42".into(),
            command_channels: None,
        });
        assert_eq!(discord.command_channels, vec![ChannelId::new("42")]);
    }

    #[test]
    fn relative_auth_file_resolves_against_data_dir() {
        let esi = EsiSettings::from_raw(RawEsiConfig::default());
        assert_eq!(
            esi.auth_file_in(Path::new("/var/lib/fuelbot")),
            Path::new("/var/lib/fuelbot/auth.json")
        );
        assert_eq!(esi.market_region_id, DEFAULT_MARKET_REGION_ID);
    }
}
