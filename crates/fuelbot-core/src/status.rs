//! Alert and status message rendering, and the on-demand status path

use chrono::{DateTime, Duration, Utc};
use fuelbot_api::{
    COLOR_ALERT, COLOR_STATUS, Commodity, MessageField, NotificationMessage, StructureSnapshot,
};
use fuelbot_config::FuelRules;
use fuelbot_provider_api::SendResult;
use fuelbot_util::{ChannelId, format_relative, format_timestamp};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Collaborators, PriceEstimator, PriceMap, daily_fuel_cost, price_lines};

pub const ALERT_TITLE: &str = "Citadel running out of fuel, FEED IT!";
pub const STATUS_TITLE: &str = "Feeding status";
pub const TOTAL_FUEL_FIELD: &str = ":ice_cube: Total fuel";
pub const LOAD_FAILURE_FIELD: &str = "Error";
pub const LOAD_FAILURE_TEXT: &str = "Unable to load structure data.";
pub const PRICES_UNAVAILABLE: &str = "Prices unavailable.";
pub const UNKNOWN_PRICE: &str = "unknown";

const DAYS_PER_MONTH: f64 = 30.0;

/// `` `3 days from now` (2021-05-11 00:00:00 UTC) ``
fn expiry_text(expires: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    format!("`{}` ({})", format_relative(expires, now), format_timestamp(expires))
}

/// Low-fuel alert for one structure
pub fn alert_message(structure: &StructureSnapshot, now: DateTime<Utc>) -> NotificationMessage {
    let when = match &structure.fuel_expires {
        Some(expires) => expiry_text(expires, &now),
        None => "`UNFUELLED`".to_string(),
    };

    NotificationMessage::new(ALERT_TITLE, COLOR_ALERT, now)
        .with_field("Where?!", format!("`{}`", structure.name))
        .with_field("When?!", when)
}

/// Reply sent when structures could not be loaded for a status request
pub fn load_failure_message(now: DateTime<Utc>) -> NotificationMessage {
    NotificationMessage::new(STATUS_TITLE, COLOR_ALERT, now)
        .with_field(LOAD_FAILURE_FIELD, LOAD_FAILURE_TEXT)
}

/// Square shown next to a structure: green, orange under a week, red under a day
pub fn fuel_symbol(structure: &StructureSnapshot, now: DateTime<Utc>) -> &'static str {
    // Unfuelled structures count as already empty.
    let Some(remaining) = structure.time_remaining(now) else {
        return ":red_square:";
    };

    if remaining < Duration::days(1) {
        ":red_square:"
    } else if remaining < Duration::days(7) {
        ":orange_square:"
    } else {
        ":green_square:"
    }
}

/// Whole number with thousands separators, e.g. `1,234,568`
pub fn format_isk(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn structure_field(
    structure: &StructureSnapshot,
    rules: &FuelRules,
    fuel_per_day: f64,
    now: DateTime<Utc>,
) -> MessageField {
    let name = format!(
        "{} {} ({})",
        fuel_symbol(structure, now),
        structure.name,
        rules.structure_type_name(structure.type_id)
    );

    let value = match &structure.fuel_expires {
        None => "`UNFUELLED`".to_string(),
        Some(expires) => {
            let services: Vec<&str> = structure.services.iter().map(|s| s.name.as_str()).collect();
            format!(
                "{} \n **Services**: {} \n **Fuel per day**: {:.0}",
                expiry_text(expires, &now),
                services.join(", "),
                fuel_per_day
            )
        }
    };

    MessageField::new(name, value)
}

fn fuel_total_text(
    heading: &str,
    blocks: f64,
    commodities: &[Commodity],
    prices: Option<&PriceMap>,
) -> String {
    let mut text = format!("**{}**: {:.0}", heading, blocks);

    let Some(prices) = prices else {
        text.push('\n');
        text.push_str(PRICES_UNAVAILABLE);
        return text;
    };

    for line in price_lines(blocks, commodities, prices) {
        text.push('\n');
        match line.cost {
            Some(cost) if line.cheapest => {
                text.push_str(&format!("**{} {}** ISK", line.label, format_isk(cost)));
            }
            Some(cost) => text.push_str(&format!("{} {} ISK", line.label, format_isk(cost))),
            None => text.push_str(&format!("{} {}", line.label, UNKNOWN_PRICE)),
        }
    }
    text
}

/// Status summary of every structure.
///
/// `prices` is `None` when the price estimate failed; the total section then
/// says so instead of showing costs.
pub fn status_message(
    structures: &[StructureSnapshot],
    rules: &FuelRules,
    commodities: &[Commodity],
    prices: Option<&PriceMap>,
    now: DateTime<Utc>,
) -> NotificationMessage {
    let mut message = NotificationMessage::new(STATUS_TITLE, COLOR_STATUS, now);

    let mut daily_total = 0.0;
    for structure in structures {
        let fuel_per_day = daily_fuel_cost(structure, rules);
        daily_total += fuel_per_day;
        message.push_field(structure_field(structure, rules, fuel_per_day, now));
    }

    let daily = fuel_total_text("Daily", daily_total, commodities, prices);
    let monthly = fuel_total_text("Monthly", daily_total * DAYS_PER_MONTH, commodities, prices);
    message.push_field(MessageField::new(
        TOTAL_FUEL_FIELD,
        format!("{}\n\n{}", daily, monthly),
    ));

    message
}

/// Builds and delivers status summaries on request.
///
/// Reads the rules and remote data only; it never touches notification state.
pub struct StatusReporter {
    collaborators: Collaborators,
    rules: Arc<FuelRules>,
    commodities: Vec<Commodity>,
    estimator: PriceEstimator,
}

impl StatusReporter {
    pub fn new(
        collaborators: Collaborators,
        rules: Arc<FuelRules>,
        commodities: Vec<Commodity>,
        estimator: PriceEstimator,
    ) -> Self {
        Self {
            collaborators,
            rules,
            commodities,
            estimator,
        }
    }

    /// Load structures and prices and render the summary
    pub async fn build(&self, now: DateTime<Utc>) -> NotificationMessage {
        let ctx = match self.collaborators.authenticate().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Status request: authentication failed");
                return load_failure_message(now);
            }
        };

        let structures = match self.collaborators.list_structures(&ctx).await {
            Ok(structures) => structures,
            Err(e) => {
                warn!(error = %e, "Status request: unable to load structures");
                return load_failure_message(now);
            }
        };

        let prices = match self
            .estimator
            .estimate(self.collaborators.market.as_ref(), &ctx, &self.commodities)
            .await
        {
            Ok(prices) => Some(prices),
            Err(e) => {
                warn!(error = %e, "Status request: unable to estimate fuel prices");
                None
            }
        };

        status_message(&structures, &self.rules, &self.commodities, prices.as_ref(), now)
    }

    /// Build a summary and send it to `channel_id`
    pub async fn reply(&self, channel_id: &ChannelId, now: DateTime<Utc>) -> SendResult<()> {
        let message = self.build(now).await;
        info!(channel_id = %channel_id, "Sending fuel status");
        self.collaborators.send(channel_id, &message).await
    }
}
