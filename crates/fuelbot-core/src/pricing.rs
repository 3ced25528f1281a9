//! Fuel price estimation

use fuelbot_api::{Commodity, PriceHistoryEntry};
use fuelbot_provider_api::{AuthContext, FetchResult, MarketHistoryProvider};
use fuelbot_util::ItemTypeId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Estimated price per commodity. Commodities without market history are absent.
pub type PriceMap = HashMap<ItemTypeId, f64>;

/// Moving average over the most recent days of market history
#[derive(Debug, Clone)]
pub struct PriceEstimator {
    window_days: usize,
    request_timeout: Duration,
}

impl PriceEstimator {
    pub fn new(window_days: usize, request_timeout: Duration) -> Self {
        Self {
            window_days: window_days.max(1),
            request_timeout,
        }
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    /// Mean of the last `window_days` daily averages, ordered by date.
    /// `None` for an empty history.
    pub fn moving_average(&self, mut history: Vec<PriceHistoryEntry>) -> Option<f64> {
        if history.is_empty() {
            return None;
        }

        history.sort_by_key(|entry| entry.date);
        let take = self.window_days.min(history.len());
        let recent = &history[history.len() - take..];
        Some(recent.iter().map(|e| e.average).sum::<f64>() / take as f64)
    }

    /// Estimate every commodity's price. The first failed fetch aborts the
    /// whole estimate.
    pub async fn estimate(
        &self,
        market: &dyn MarketHistoryProvider,
        ctx: &AuthContext,
        commodities: &[Commodity],
    ) -> FetchResult<PriceMap> {
        let mut prices = PriceMap::new();

        for commodity in commodities {
            let history =
                timeout(self.request_timeout, market.price_history(ctx, commodity.type_id)).await??;

            match self.moving_average(history) {
                Some(price) => {
                    debug!(type_id = %commodity.type_id, label = %commodity.label, price, "Estimated price");
                    prices.insert(commodity.type_id, price);
                }
                None => {
                    debug!(type_id = %commodity.type_id, label = %commodity.label, "No market history");
                }
            }
        }

        Ok(prices)
    }
}

/// Cost of a quantity of fuel in one commodity
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLine {
    pub label: String,
    /// `None` when the commodity has no price
    pub cost: Option<f64>,
    pub cheapest: bool,
}

/// Cost of `blocks` fuel blocks in each commodity, in commodity order, with
/// the cheapest one flagged. Ties go to the earlier commodity; commodities
/// without a price are never the cheapest.
pub fn price_lines(blocks: f64, commodities: &[Commodity], prices: &PriceMap) -> Vec<PriceLine> {
    let mut lines: Vec<PriceLine> = commodities
        .iter()
        .map(|c| PriceLine {
            label: c.label.clone(),
            cost: prices.get(&c.type_id).map(|price| price * blocks),
            cheapest: false,
        })
        .collect();

    if let Some(index) = cheapest_index(&lines) {
        lines[index].cheapest = true;
    }
    lines
}

fn cheapest_index(lines: &[PriceLine]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, line) in lines.iter().enumerate() {
        let Some(cost) = line.cost else { continue };
        match best {
            Some((_, best_cost)) if cost >= best_cost => {}
            _ => best = Some((i, cost)),
        }
    }
    best.map(|(i, _)| i)
}
