//! Price threshold detector

use sentinel_core::utils::{checksum_address, timestamp_to_iso};
use sentinel_core::ScaledDecimal;
use sentinel_ledger::FeedSnapshot;

use super::Detection;
use crate::cursor::PollCursor;
use crate::events::EventPayload;
use crate::subscription::ThresholdMode;

/// Emits when a price is, or moves, past a fixed level.
///
/// `above` and `below` fire once per excursion: the latch stays set while
/// the condition holds and re-arms when it stops holding. `cross` compares
/// against the previous poll's price and fires on every crossing.
#[derive(Debug, Clone)]
pub struct ThresholdDetector {
    mode: ThresholdMode,
    threshold: ScaledDecimal,
}

impl ThresholdDetector {
    pub fn new(mode: ThresholdMode, threshold: ScaledDecimal) -> Self {
        Self { mode, threshold }
    }

    pub fn detect(&self, feed: &FeedSnapshot, prior: Option<&PollCursor>) -> Detection {
        let price = feed.snapshot.price();
        let threshold = &self.threshold;

        let mut cursor = prior.cloned().unwrap_or_default();
        let last_price = cursor.last_price.replace(price.clone());

        let reason = match self.mode {
            ThresholdMode::Above | ThresholdMode::Below => {
                let holds = match self.mode {
                    ThresholdMode::Above => price > *threshold,
                    _ => price < *threshold,
                };
                let was_triggered = cursor.was_triggered.replace(holds);

                match was_triggered {
                    Some(false) if holds => Some(format!(
                        "Price {} is {} threshold {}",
                        price,
                        self.mode,
                        threshold
                    )),
                    _ => None,
                }
            }
            ThresholdMode::Cross => last_price.and_then(|last| {
                if last <= *threshold && price > *threshold {
                    Some(format!("Price crossed above {}", threshold))
                } else if last >= *threshold && price < *threshold {
                    Some(format!("Price crossed below {}", threshold))
                } else {
                    None
                }
            }),
        };

        let Some(trigger_reason) = reason else {
            return Detection::silent(cursor);
        };

        let event = EventPayload::PriceThreshold {
            pair: feed.description.clone(),
            current_price: price.to_string(),
            threshold_price: threshold.to_string(),
            threshold_type: self.mode,
            trigger_reason,
            round_id: feed.snapshot.round_id.to_string(),
            updated_at: timestamp_to_iso(feed.snapshot.updated_at),
            feed_address: checksum_address(&feed.feed),
        };

        Detection::single(event, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::snapshot;

    fn run(detector: &ThresholdDetector, answers: &[i64]) -> Vec<usize> {
        let mut cursor: Option<PollCursor> = None;
        answers
            .iter()
            .enumerate()
            .map(|(round, answer)| {
                let detection = detector.detect(&snapshot(round as u64 + 1, *answer), cursor.as_ref());
                cursor = Some(detection.cursor);
                detection.events.len()
            })
            .collect()
    }

    fn dollars(amount: i64) -> i64 {
        amount * 100_000_000
    }

    #[test]
    fn test_cross_fires_once_per_crossing() {
        let detector = ThresholdDetector::new(ThresholdMode::Cross, ScaledDecimal::new(1000, 0));

        let emitted = run(&detector, &[dollars(900), dollars(1100), dollars(1100), dollars(950)]);
        assert_eq!(emitted, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_cross_reason_names_direction() {
        let detector = ThresholdDetector::new(ThresholdMode::Cross, ScaledDecimal::new(1000, 0));
        let seeded = detector.detect(&snapshot(1, dollars(900)), None).cursor;

        let detection = detector.detect(&snapshot(2, dollars(1100)), Some(&seeded));
        match &detection.events[0] {
            EventPayload::PriceThreshold {
                trigger_reason,
                threshold_type,
                current_price,
                ..
            } => {
                assert_eq!(trigger_reason, "Price crossed above 1000");
                assert_eq!(*threshold_type, ThresholdMode::Cross);
                assert_eq!(current_price, "1100.00000000");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_cross_never_fires_on_seeding_poll() {
        let detector = ThresholdDetector::new(ThresholdMode::Cross, ScaledDecimal::new(1000, 0));
        let detection = detector.detect(&snapshot(1, dollars(1100)), None);
        assert!(detection.events.is_empty());
        assert_eq!(detection.cursor.was_triggered, None);
    }

    #[test]
    fn test_above_latches_until_condition_clears() {
        let detector = ThresholdDetector::new(ThresholdMode::Above, ScaledDecimal::new(1000, 0));

        let emitted = run(
            &detector,
            &[dollars(900), dollars(1100), dollars(1200), dollars(999), dollars(1001)],
        );
        assert_eq!(emitted, vec![0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_above_seeds_latch_when_already_above() {
        let detector = ThresholdDetector::new(ThresholdMode::Above, ScaledDecimal::new(1000, 0));

        let emitted = run(&detector, &[dollars(1100), dollars(1200)]);
        assert_eq!(emitted, vec![0, 0]);
    }

    #[test]
    fn test_below_reason() {
        let detector = ThresholdDetector::new(ThresholdMode::Below, ScaledDecimal::parse("1.5").unwrap());
        let seeded = detector.detect(&snapshot(1, 200_000_000), None).cursor;
        assert_eq!(seeded.was_triggered, Some(false));

        let detection = detector.detect(&snapshot(2, 140_000_000), Some(&seeded));
        assert!(matches!(
            detection.events.as_slice(),
            [EventPayload::PriceThreshold { trigger_reason, .. }]
                if trigger_reason == "Price 1.40000000 is below threshold 1.5"
        ));
        assert_eq!(detection.cursor.was_triggered, Some(true));
    }
}
