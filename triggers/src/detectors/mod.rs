//! Event detectors
//!
//! Each detector compares what was just read against the subscription's
//! previous cursor and returns the events to emit together with the cursor
//! to persist. Detectors do no I/O; the poller fetches their inputs.

pub mod fulfillment;
pub mod new_round;
pub mod price_delta;
pub mod sequencer;
pub mod threshold;

pub use fulfillment::{scan_range, FulfillmentScanner, ScanRange};
pub use new_round::NewRoundDetector;
pub use price_delta::{PriceDeltaDetector, CHANGE_PERCENT_DECIMALS, MIN_PERCENT_SCALE};
pub use sequencer::SequencerStatusDetector;
pub use threshold::ThresholdDetector;

use crate::cursor::PollCursor;
use crate::events::EventPayload;

/// Result of one detection pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub events: Vec<EventPayload>,
    pub cursor: PollCursor,
}

impl Detection {
    pub fn new(events: Vec<EventPayload>, cursor: PollCursor) -> Self {
        Self { events, cursor }
    }

    /// Advance the cursor without emitting
    pub fn silent(cursor: PollCursor) -> Self {
        Self::new(Vec::new(), cursor)
    }

    pub fn single(event: EventPayload, cursor: PollCursor) -> Self {
        Self::new(vec![event], cursor)
    }
}
