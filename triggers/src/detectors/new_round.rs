//! New-round detector

use sentinel_core::utils::{checksum_address, timestamp_to_iso};
use sentinel_ledger::FeedSnapshot;

use super::Detection;
use crate::cursor::PollCursor;
use crate::events::EventPayload;

/// Emits whenever the full round id changes, including phase changes
#[derive(Debug, Clone, Default)]
pub struct NewRoundDetector;

impl NewRoundDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, feed: &FeedSnapshot, prior: Option<&PollCursor>) -> Detection {
        let round_id = feed.snapshot.round_id.to_string();

        let mut cursor = prior.cloned().unwrap_or_default();
        let previous_round_id = match cursor.last_round_id.replace(round_id.clone()) {
            Some(previous) if previous != round_id => previous,
            _ => return Detection::silent(cursor),
        };

        let event = EventPayload::NewRound {
            pair: feed.description.clone(),
            price: feed.snapshot.formatted_answer(),
            round_id,
            previous_round_id,
            started_at: timestamp_to_iso(feed.snapshot.started_at),
            updated_at: timestamp_to_iso(feed.snapshot.updated_at),
            feed_address: checksum_address(&feed.feed),
        };

        Detection::single(event, cursor)
    }
}
