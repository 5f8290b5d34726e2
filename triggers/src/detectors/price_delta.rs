//! Percent-move detector

use tracing::{debug, warn};

use sentinel_core::utils::{checksum_address, timestamp_to_iso};
use sentinel_core::ScaledDecimal;
use sentinel_ledger::FeedSnapshot;

use super::Detection;
use crate::cursor::PollCursor;
use crate::events::{ChangeDirection, EventPayload};

/// Fractional digits of the reported `changePercent`
pub const CHANGE_PERCENT_DECIMALS: u32 = 4;

/// Lowest scale the percent change is computed at before comparison
pub const MIN_PERCENT_SCALE: u32 = 8;

/// Emits when a new round moved the price by at least the threshold percent
#[derive(Debug, Clone)]
pub struct PriceDeltaDetector {
    change_threshold: ScaledDecimal,
}

impl PriceDeltaDetector {
    pub fn new(change_threshold: ScaledDecimal) -> Self {
        Self { change_threshold }
    }

    pub fn detect(&self, feed: &FeedSnapshot, prior: Option<&PollCursor>) -> Detection {
        let price = feed.snapshot.price();
        let round_id = feed.snapshot.round_id.to_string();

        let mut cursor = prior.cloned().unwrap_or_default();
        let last_price = cursor.last_price.replace(price.clone());
        let last_round_id = cursor.last_round_id.replace(round_id.clone());

        let last_price = match (last_price, last_round_id) {
            (Some(last_price), Some(last_round_id)) if last_round_id != round_id => last_price,
            _ => return Detection::silent(cursor),
        };

        if last_price.is_zero() {
            warn!(feed = %feed.feed, round_id = %round_id, "Previous price is zero, skipping change check");
            return Detection::silent(cursor);
        }

        let scale = MIN_PERCENT_SCALE.max(self.change_threshold.scale());
        let change = match price.percent_change(&last_price, scale) {
            Ok(change) => change,
            Err(err) => {
                warn!(feed = %feed.feed, error = %err, "Failed to compute price change");
                return Detection::silent(cursor);
            }
        };

        if change < self.change_threshold {
            debug!(
                feed = %feed.feed,
                change = %change,
                threshold = %self.change_threshold,
                "Price change below threshold"
            );
            return Detection::silent(cursor);
        }

        let change_direction = if price > last_price {
            ChangeDirection::Up
        } else {
            ChangeDirection::Down
        };

        let event = EventPayload::PriceUpdate {
            pair: feed.description.clone(),
            current_price: price.to_string(),
            previous_price: last_price.to_string(),
            change_percent: change.rescale(CHANGE_PERCENT_DECIMALS).to_string(),
            change_direction,
            round_id,
            updated_at: timestamp_to_iso(feed.snapshot.updated_at),
            feed_address: checksum_address(&feed.feed),
        };

        Detection::single(event, cursor)
    }
}
