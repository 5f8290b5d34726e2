//! L2 sequencer uptime interpretation
//!
//! Uptime feeds report `0` while the sequencer is up and `1` while it is down;
//! `startedAt` marks the last status transition.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::round::RoundData;

/// Time after a sequencer restart during which prices should be distrusted
pub const SEQUENCER_GRACE_PERIOD_SECS: u64 = 3600;

/// Sequencer status derived from an uptime feed round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerHealth {
    pub is_up: bool,
    /// Raw feed answer, `None` if it does not fit an i64
    pub status_code: Option<i64>,
    /// Start of the current status
    pub started_at: u64,
    /// Seconds spent in the current status
    pub duration_secs: u64,
    pub within_grace_period: bool,
    pub grace_period_remaining_secs: u64,
}

impl SequencerHealth {
    pub fn from_answer(answer: &BigInt, started_at: u64, now: u64) -> Self {
        let is_up = answer.is_zero();
        let duration_secs = now.saturating_sub(started_at);
        let within_grace_period = is_up && duration_secs < SEQUENCER_GRACE_PERIOD_SECS;

        Self {
            is_up,
            status_code: answer.to_i64(),
            started_at,
            duration_secs,
            within_grace_period,
            grace_period_remaining_secs: if within_grace_period {
                SEQUENCER_GRACE_PERIOD_SECS - duration_secs
            } else {
                0
            },
        }
    }

    pub fn from_round(round: &RoundData, now: u64) -> Self {
        Self::from_answer(&round.answer, round.started_at, now)
    }

    /// `UP` or `DOWN`
    pub fn status_label(&self) -> &'static str {
        status_label(self.is_up)
    }

    pub fn recommendation(&self) -> &'static str {
        if self.is_up && !self.within_grace_period {
            "Safe to use price feeds"
        } else if self.within_grace_period {
            "Grace period active - consider waiting before using stale-sensitive data"
        } else {
            "Sequencer is down - price feeds may be stale"
        }
    }

    /// Alert text for a status transition into this state
    pub fn transition_alert(&self) -> &'static str {
        if self.is_up {
            "Sequencer is back online. Grace period may be in effect."
        } else {
            "CRITICAL: Sequencer is down. Price feeds may be stale."
        }
    }
}

/// `UP` or `DOWN`
pub fn status_label(is_up: bool) -> &'static str {
    if is_up {
        "UP"
    } else {
        "DOWN"
    }
}
