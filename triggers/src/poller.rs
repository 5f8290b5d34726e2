//! Subscription poller
//!
//! One poll reads the subscription's cursor, fetches what its detector
//! needs, runs the detector and writes the new cursor back. The write only
//! happens after every fetch succeeded, so a failed poll leaves the stored
//! cursor exactly as it was.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use sentinel_core::utils::{now_iso, unix_now};
use sentinel_core::{LogFilter, Network};
use sentinel_ledger::{FeedReader, LedgerClient};

use crate::cursor::PollCursor;
use crate::detectors::{
    scan_range, Detection, FulfillmentScanner, NewRoundDetector, PriceDeltaDetector, SequencerStatusDetector,
    ThresholdDetector,
};
use crate::events::EmittedEvent;
use crate::store::StateStore;
use crate::subscription::{ResolvedSubscription, ResolvedTrigger};
use crate::Result;

/// Polls resolved subscriptions against one network
pub struct TriggerPoller<L: LedgerClient, S: StateStore> {
    reader: FeedReader<L>,
    store: Arc<S>,
}

impl<L: LedgerClient, S: StateStore> TriggerPoller<L, S> {
    /// Create a new poller
    pub fn new(client: Arc<L>, store: Arc<S>, network: Network) -> Self {
        Self {
            reader: FeedReader::new(client, network),
            store,
        }
    }

    pub fn network(&self) -> Network {
        self.reader.network()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Poll once at the current wall-clock time
    pub async fn poll(&self, subscription: &ResolvedSubscription) -> Result<Vec<EmittedEvent>> {
        self.poll_at(subscription, unix_now()).await
    }

    /// Poll once with `now` as the unix time used for durations
    pub async fn poll_at(&self, subscription: &ResolvedSubscription, now: u64) -> Result<Vec<EmittedEvent>> {
        let key = subscription.cursor_key(self.network());
        let bag = self.store.get(&key).await?;
        let prior = PollCursor::from_bag(&bag)?;

        debug!(
            subscription = subscription.id.as_str(),
            event = subscription.trigger.event_name(),
            seeded = prior.is_some(),
            "Polling subscription"
        );

        let detection = self.detect(&subscription.trigger, prior.as_ref(), now).await?;
        self.store.set(&key, detection.cursor.to_bag()).await?;

        if detection.events.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            subscription = subscription.id.as_str(),
            event = subscription.trigger.event_name(),
            count = detection.events.len(),
            "Trigger fired"
        );

        let network = self.network();
        let timestamp = now_iso();
        Ok(detection
            .events
            .into_iter()
            .map(|payload| EmittedEvent::new(payload, network, timestamp.clone()))
            .collect())
    }

    async fn detect(&self, trigger: &ResolvedTrigger, prior: Option<&PollCursor>, now: u64) -> Result<Detection> {
        let detection = match trigger {
            ResolvedTrigger::PriceUpdate { feed, change_threshold } => {
                let snapshot = self.reader.latest_snapshot(*feed).await?;
                PriceDeltaDetector::new(change_threshold.clone()).detect(&snapshot, prior)
            }
            ResolvedTrigger::PriceThreshold { feed, mode, threshold } => {
                let snapshot = self.reader.latest_snapshot(*feed).await?;
                ThresholdDetector::new(*mode, threshold.clone()).detect(&snapshot, prior)
            }
            ResolvedTrigger::NewRound { feed } => {
                let snapshot = self.reader.latest_snapshot(*feed).await?;
                NewRoundDetector::new().detect(&snapshot, prior)
            }
            ResolvedTrigger::LogScan {
                filter,
                lookback_blocks,
            } => self.scan_logs(filter, *lookback_blocks, prior).await?,
            ResolvedTrigger::SequencerChange { feed } => {
                let round = self.reader.client().read_latest_round(*feed).await?;
                SequencerStatusDetector::new(*feed).detect(&round, now, prior)
            }
        };

        Ok(detection)
    }

    async fn scan_logs(&self, filter: &LogFilter, lookback_blocks: u64, prior: Option<&PollCursor>) -> Result<Detection> {
        let client = self.reader.client();
        let current_block = client.current_block_number().await?;
        let scanner = FulfillmentScanner::new(filter.kind);

        let Some(range) = scan_range(prior, current_block, lookback_blocks) else {
            // Nothing new, or the endpoint is behind the last scanned block
            debug!(contract = %filter.address, current_block, "No new blocks to scan");
            return Ok(Detection::silent(prior.cloned().unwrap_or_default()));
        };

        let logs = client.query_logs(filter, range.from_block, range.to_block).await?;

        let blocks: BTreeSet<u64> = logs.iter().map(|log| log.block_number).collect();
        let timestamps = try_join_all(blocks.iter().map(|block| client.block_timestamp(*block))).await?;
        let block_times: BTreeMap<u64, u64> = blocks
            .into_iter()
            .zip(timestamps)
            .filter_map(|(block, timestamp)| timestamp.map(|ts| (block, ts)))
            .collect();

        debug!(
            contract = %filter.address,
            event = %filter.kind,
            from_block = range.from_block,
            to_block = range.to_block,
            matches = logs.len(),
            "Scanned logs"
        );

        Ok(scanner.detect(&logs, &block_times, current_block, prior))
    }
}
