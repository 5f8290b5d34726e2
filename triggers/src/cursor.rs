//! Per-subscription poll cursor and its persisted form
//!
//! The cursor is stored as an opaque string-keyed bag so any key-value
//! backend can hold it. Prices are written as decimal strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sentinel_core::ScaledDecimal;

use crate::error::{Result, TriggerError};

const LAST_PRICE: &str = "lastPrice";
const LAST_ROUND_ID: &str = "lastRoundId";
const LAST_STATUS: &str = "lastStatus";
const LAST_BLOCK: &str = "lastBlock";
const WAS_TRIGGERED: &str = "wasTriggered";

/// A single persisted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Integer(u64),
    Text(String),
}

/// Persisted cursor representation
pub type StateBag = BTreeMap<String, StateValue>;

/// What a detector remembers between two polls of one subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollCursor {
    pub last_price: Option<ScaledDecimal>,
    /// Full round id as a decimal string
    pub last_round_id: Option<String>,
    /// Last sequencer status, `true` when up
    pub last_status: Option<bool>,
    /// Last block a log scan covered
    pub last_block: Option<u64>,
    /// Threshold latch for `above` / `below`
    pub was_triggered: Option<bool>,
}

impl PollCursor {
    /// Decode a bag; an empty bag means the subscription was never polled
    pub fn from_bag(bag: &StateBag) -> Result<Option<Self>> {
        if bag.is_empty() {
            return Ok(None);
        }

        let last_price = match text(bag, LAST_PRICE)? {
            Some(raw) => Some(
                ScaledDecimal::parse(raw)
                    .map_err(|e| TriggerError::cursor(format!("{} is not a decimal: {}", LAST_PRICE, e)))?,
            ),
            None => None,
        };

        Ok(Some(Self {
            last_price,
            last_round_id: text(bag, LAST_ROUND_ID)?.map(str::to_string),
            last_status: boolean(bag, LAST_STATUS)?,
            last_block: integer(bag, LAST_BLOCK)?,
            was_triggered: boolean(bag, WAS_TRIGGERED)?,
        }))
    }

    /// Encode into a bag, omitting unset fields
    pub fn to_bag(&self) -> StateBag {
        let mut bag = StateBag::new();
        if let Some(price) = &self.last_price {
            bag.insert(LAST_PRICE.to_string(), StateValue::Text(price.to_string()));
        }
        if let Some(round_id) = &self.last_round_id {
            bag.insert(LAST_ROUND_ID.to_string(), StateValue::Text(round_id.clone()));
        }
        if let Some(status) = self.last_status {
            bag.insert(LAST_STATUS.to_string(), StateValue::Bool(status));
        }
        if let Some(block) = self.last_block {
            bag.insert(LAST_BLOCK.to_string(), StateValue::Integer(block));
        }
        if let Some(triggered) = self.was_triggered {
            bag.insert(WAS_TRIGGERED.to_string(), StateValue::Bool(triggered));
        }
        bag
    }
}

fn text<'a>(bag: &'a StateBag, key: &str) -> Result<Option<&'a str>> {
    match bag.get(key) {
        None => Ok(None),
        Some(StateValue::Text(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(TriggerError::cursor(format!("{} should be text, got {:?}", key, other))),
    }
}

fn boolean(bag: &StateBag, key: &str) -> Result<Option<bool>> {
    match bag.get(key) {
        None => Ok(None),
        Some(StateValue::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(TriggerError::cursor(format!("{} should be a bool, got {:?}", key, other))),
    }
}

fn integer(bag: &StateBag, key: &str) -> Result<Option<u64>> {
    match bag.get(key) {
        None => Ok(None),
        Some(StateValue::Integer(value)) => Ok(Some(*value)),
        // Values written by hand may arrive as strings
        Some(StateValue::Text(value)) => value
            .parse()
            .map(Some)
            .map_err(|_| TriggerError::cursor(format!("{} is not an integer: {}", key, value))),
        Some(other) => Err(TriggerError::cursor(format!("{} should be an integer, got {:?}", key, other))),
    }
}
