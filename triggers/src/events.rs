//! Events produced by the detectors
//!
//! Serialized as flat camelCase JSON objects tagged by `event`, with the
//! emitting network and a wall-clock timestamp merged in.

use serde::Serialize;

use sentinel_core::Network;

use crate::subscription::ThresholdMode;

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Up,
    Down,
}

/// Detector output, one variant per event kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    PriceUpdate {
        pair: String,
        current_price: String,
        previous_price: String,
        /// Percent change, 4 decimal places
        change_percent: String,
        change_direction: ChangeDirection,
        round_id: String,
        updated_at: String,
        feed_address: String,
    },

    #[serde(rename_all = "camelCase")]
    PriceThreshold {
        pair: String,
        current_price: String,
        threshold_price: String,
        threshold_type: ThresholdMode,
        trigger_reason: String,
        round_id: String,
        updated_at: String,
        feed_address: String,
    },

    #[serde(rename_all = "camelCase")]
    NewRound {
        pair: String,
        price: String,
        round_id: String,
        previous_round_id: String,
        started_at: String,
        updated_at: String,
        feed_address: String,
    },

    #[serde(rename_all = "camelCase")]
    VrfFulfilled {
        request_id: String,
        random_words: Vec<String>,
        block_number: u64,
        transaction_hash: String,
        /// Block time, `null` when the block could not be read
        block_timestamp: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    UpkeepPerformed {
        upkeep_id: String,
        success: Option<bool>,
        /// LINK paid, 18 decimals
        total_payment: Option<String>,
        gas_used: Option<String>,
        block_number: u64,
        transaction_hash: String,
        block_timestamp: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    SequencerChange {
        is_sequencer_up: bool,
        previous_status: String,
        current_status: String,
        status_code: Option<i64>,
        state_started_at: String,
        is_within_grace_period: bool,
        grace_period_remaining_seconds: u64,
        feed_address: String,
        alert: String,
    },
}

impl EventPayload {
    /// Value of the `event` tag
    pub fn event_name(&self) -> &'static str {
        match self {
            EventPayload::PriceUpdate { .. } => "priceUpdate",
            EventPayload::PriceThreshold { .. } => "priceThreshold",
            EventPayload::NewRound { .. } => "newRound",
            EventPayload::VrfFulfilled { .. } => "vrfFulfilled",
            EventPayload::UpkeepPerformed { .. } => "upkeepPerformed",
            EventPayload::SequencerChange { .. } => "sequencerChange",
        }
    }
}

/// An event as handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedEvent {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub network: Network,
    /// ISO-8601 emission time
    pub timestamp: String,
}

impl EmittedEvent {
    pub fn new(payload: EventPayload, network: Network, timestamp: String) -> Self {
        Self {
            payload,
            network,
            timestamp,
        }
    }

    pub fn event_name(&self) -> &'static str {
        self.payload.event_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitted_event_is_flat_camel_case() {
        let event = EmittedEvent::new(
            EventPayload::PriceUpdate {
                pair: "ETH / USD".to_string(),
                current_price: "1060.00000000".to_string(),
                previous_price: "1000.00000000".to_string(),
                change_percent: "6.0000".to_string(),
                change_direction: ChangeDirection::Up,
                round_id: "6".to_string(),
                updated_at: "2023-11-14T22:13:20.000Z".to_string(),
                feed_address: "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419".to_string(),
            },
            Network::EthereumMainnet,
            "2024-01-01T00:00:00.000Z".to_string(),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "priceUpdate");
        assert_eq!(json["changeDirection"], "up");
        assert_eq!(json["changePercent"], "6.0000");
        assert_eq!(json["network"], "ethereum-mainnet");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00.000Z");
        assert_eq!(event.event_name(), "priceUpdate");
    }

    #[test]
    fn test_missing_block_time_serializes_as_null() {
        let payload = EventPayload::VrfFulfilled {
            request_id: "77".to_string(),
            random_words: vec!["1".to_string(), "2".to_string()],
            block_number: 100,
            transaction_hash: format!("0x{}", "ab".repeat(32)),
            block_timestamp: None,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event"], "vrfFulfilled");
        assert_eq!(json["randomWords"][1], "2");
        assert!(json["blockTimestamp"].is_null());
    }
}
