//! L2 sequencer status-change detector

use ethers::types::Address;
use tracing::info;

use sentinel_core::sequencer::status_label;
use sentinel_core::utils::{checksum_address, timestamp_to_iso};
use sentinel_core::{RoundData, SequencerHealth};

use super::Detection;
use crate::cursor::PollCursor;
use crate::events::EventPayload;

/// Emits when the uptime feed flips between up and down
#[derive(Debug, Clone, Copy)]
pub struct SequencerStatusDetector {
    feed: Address,
}

impl SequencerStatusDetector {
    pub fn new(feed: Address) -> Self {
        Self { feed }
    }

    pub fn detect(&self, round: &RoundData, now: u64, prior: Option<&PollCursor>) -> Detection {
        let health = SequencerHealth::from_round(round, now);

        let mut cursor = prior.cloned().unwrap_or_default();
        let previous = match cursor.last_status.replace(health.is_up) {
            Some(previous) if previous != health.is_up => previous,
            _ => return Detection::silent(cursor),
        };

        info!(
            feed = %self.feed,
            from = status_label(previous),
            to = health.status_label(),
            "Sequencer status changed"
        );

        let event = EventPayload::SequencerChange {
            is_sequencer_up: health.is_up,
            previous_status: status_label(previous).to_string(),
            current_status: health.status_label().to_string(),
            status_code: health.status_code,
            state_started_at: timestamp_to_iso(health.started_at),
            is_within_grace_period: health.within_grace_period,
            grace_period_remaining_seconds: health.grace_period_remaining_secs,
            feed_address: checksum_address(&self.feed),
            alert: health.transition_alert().to_string(),
        };

        Detection::single(event, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use sentinel_core::RoundId;

    fn uptime_round(answer: i64, started_at: u64) -> RoundData {
        RoundData {
            round_id: RoundId::new(1),
            answer: BigInt::from(answer),
            started_at,
            updated_at: started_at,
            answered_in_round: RoundId::new(1),
        }
    }

    #[test]
    fn test_first_poll_seeds_status() {
        let detector = SequencerStatusDetector::new(Address::repeat_byte(0x22));
        let detection = detector.detect(&uptime_round(1, 1_000), 1_100, None);
        assert!(detection.events.is_empty());
        assert_eq!(detection.cursor.last_status, Some(false));
    }

    #[test]
    fn test_recovery_reports_grace_period() {
        let detector = SequencerStatusDetector::new(Address::repeat_byte(0x22));
        let down = detector.detect(&uptime_round(1, 1_000), 1_100, None).cursor;

        let detection = detector.detect(&uptime_round(0, 2_000), 2_600, Some(&down));
        match &detection.events[..] {
            [EventPayload::SequencerChange {
                is_sequencer_up,
                previous_status,
                current_status,
                status_code,
                is_within_grace_period,
                grace_period_remaining_seconds,
                alert,
                ..
            }] => {
                assert!(*is_sequencer_up);
                assert_eq!(previous_status, "DOWN");
                assert_eq!(current_status, "UP");
                assert_eq!(*status_code, Some(0));
                assert!(*is_within_grace_period);
                assert_eq!(*grace_period_remaining_seconds, 3_000);
                assert!(alert.starts_with("Sequencer is back online"));
            }
            other => panic!("unexpected events {:?}", other),
        }
        assert_eq!(detection.cursor.last_status, Some(true));
    }

    #[test]
    fn test_unchanged_status_is_silent() {
        let detector = SequencerStatusDetector::new(Address::repeat_byte(0x22));
        let up = detector.detect(&uptime_round(0, 1_000), 1_100, None).cursor;

        let detection = detector.detect(&uptime_round(0, 1_000), 9_000, Some(&up));
        assert!(detection.events.is_empty());
    }
}
