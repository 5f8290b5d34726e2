//! Log scanner for VRF fulfillments and automation performs

use std::collections::BTreeMap;

use sentinel_core::decimal;
use sentinel_core::utils::timestamp_to_iso;
use sentinel_core::{FulfillmentKind, LogEntry};
use sentinel_ledger::abi::u256_to_bigint;
use sentinel_ledger::reader::TOKEN_DECIMALS;

use super::Detection;
use crate::cursor::PollCursor;
use crate::events::EventPayload;

/// Inclusive block range to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub from_block: u64,
    pub to_block: u64,
}

/// Blocks not yet covered: after `last_block`, or the lookback window on the
/// first poll. `None` when there is nothing new to scan.
pub fn scan_range(prior: Option<&PollCursor>, current_block: u64, lookback_blocks: u64) -> Option<ScanRange> {
    let from_block = match prior.and_then(|cursor| cursor.last_block) {
        Some(last_block) => last_block.saturating_add(1),
        None => current_block.saturating_sub(lookback_blocks),
    };

    (from_block <= current_block).then_some(ScanRange {
        from_block,
        to_block: current_block,
    })
}

/// Turns every matching log into one event.
///
/// Unlike the feed detectors this one emits on its first poll too: logs found
/// in the lookback window are reported.
#[derive(Debug, Clone, Copy)]
pub struct FulfillmentScanner {
    kind: FulfillmentKind,
}

impl FulfillmentScanner {
    pub fn new(kind: FulfillmentKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> FulfillmentKind {
        self.kind
    }

    /// `block_times` maps block numbers to their unix timestamps where known
    pub fn detect(
        &self,
        logs: &[LogEntry],
        block_times: &BTreeMap<u64, u64>,
        current_block: u64,
        prior: Option<&PollCursor>,
    ) -> Detection {
        let mut cursor = prior.cloned().unwrap_or_default();
        cursor.last_block = Some(current_block);

        let events = logs
            .iter()
            .map(|log| {
                let block_timestamp = block_times.get(&log.block_number).map(|ts| timestamp_to_iso(*ts));
                self.event(log, block_timestamp)
            })
            .collect();

        Detection::new(events, cursor)
    }

    fn event(&self, log: &LogEntry, block_timestamp: Option<String>) -> EventPayload {
        match self.kind {
            FulfillmentKind::RandomWordsFulfilled => EventPayload::VrfFulfilled {
                request_id: log.uint_arg("requestId").map(|id| id.to_string()).unwrap_or_default(),
                random_words: log
                    .uint_array_arg("randomWords")
                    .unwrap_or_default()
                    .iter()
                    .map(|word| word.to_string())
                    .collect(),
                block_number: log.block_number,
                transaction_hash: log.transaction_hash_hex(),
                block_timestamp,
            },
            FulfillmentKind::UpkeepPerformed => EventPayload::UpkeepPerformed {
                upkeep_id: log.uint_arg("id").map(|id| id.to_string()).unwrap_or_default(),
                success: log.bool_arg("success"),
                total_payment: log
                    .uint_arg("totalPayment")
                    .map(|payment| decimal::format(&u256_to_bigint(payment), TOKEN_DECIMALS)),
                gas_used: log.uint_arg("gasUsed").map(|gas| gas.to_string()),
                block_number: log.block_number,
                transaction_hash: log.transaction_hash_hex(),
                block_timestamp,
            },
        }
    }
}
