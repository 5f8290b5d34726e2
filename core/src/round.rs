//! Oracle round data
//!
//! Aggregator round ids are 80-bit values packed as
//! `phase (16 bits) | aggregator round (64 bits)`. Only the low 64 bits are
//! comparable within one phase; a phase change always yields a new id.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decimal::{self, ScaledDecimal};
use crate::error::{CoreError, Result};

/// Age after which a feed answer is reported as stale
pub const DEFAULT_STALENESS_THRESHOLD_SECS: u64 = 3600;

const AGGREGATOR_ROUND_MASK: u128 = (1u128 << 64) - 1;

/// Packed aggregator round identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RoundId(u128);

impl RoundId {
    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Build an id from its phase and aggregator round parts
    pub fn from_parts(phase_id: u16, aggregator_round: u64) -> Self {
        Self(((phase_id as u128) << 64) | aggregator_round as u128)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Phase id (high bits)
    pub fn phase_id(&self) -> u128 {
        self.0 >> 64
    }

    /// Aggregator round id (low 64 bits)
    pub fn aggregator_round_id(&self) -> u64 {
        (self.0 & AGGREGATOR_ROUND_MASK) as u64
    }

    /// Same aggregator phase as `other`
    pub fn same_phase(&self, other: &RoundId) -> bool {
        self.phase_id() == other.phase_id()
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoundId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u128>()
            .map(RoundId)
            .map_err(|_| CoreError::InvalidRoundId(s.to_string()))
    }
}

impl From<u128> for RoundId {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl Serialize for RoundId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for RoundId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw `latestRoundData` / `getRoundData` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: RoundId,
    pub answer: BigInt,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: RoundId,
}

/// One oracle observation together with its decimal scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub round_id: RoundId,
    pub answer: BigInt,
    pub decimals: u32,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: RoundId,
}

impl RoundSnapshot {
    pub fn from_round(round: RoundData, decimals: u32) -> Self {
        Self {
            round_id: round.round_id,
            answer: round.answer,
            decimals,
            started_at: round.started_at,
            updated_at: round.updated_at,
            answered_in_round: round.answered_in_round,
        }
    }

    /// Answer as a fixed-point value
    pub fn price(&self) -> ScaledDecimal {
        ScaledDecimal::new(self.answer.clone(), self.decimals)
    }

    /// Answer rendered with `decimals` fractional digits
    pub fn formatted_answer(&self) -> String {
        decimal::format(&self.answer, self.decimals)
    }

    /// A zero `updated_at` means the round was never answered
    pub fn is_answered(&self) -> bool {
        self.updated_at != 0
    }

    /// Seconds since the last update, `None` when the round was never answered
    pub fn staleness_seconds(&self, now: u64) -> Option<u64> {
        if !self.is_answered() {
            return None;
        }
        Some(now.saturating_sub(self.updated_at))
    }

    /// `Some(true)` when older than `max_age_secs`; `None` when unknown
    pub fn is_stale(&self, now: u64, max_age_secs: u64) -> Option<bool> {
        self.staleness_seconds(now).map(|age| age > max_age_secs)
    }

    pub fn phase_id(&self) -> u128 {
        self.round_id.phase_id()
    }

    pub fn aggregator_round_id(&self) -> u64 {
        self.round_id.aggregator_round_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(updated_at: u64) -> RoundSnapshot {
        RoundSnapshot {
            round_id: RoundId::from_parts(2, 42),
            answer: BigInt::from(250_012_345_678i64),
            decimals: 8,
            started_at: updated_at,
            updated_at,
            answered_in_round: RoundId::from_parts(2, 42),
        }
    }

    #[test]
    fn test_round_id_packing() {
        let id = RoundId::from_parts(5, 1234);
        assert_eq!(id.phase_id(), 5);
        assert_eq!(id.aggregator_round_id(), 1234);
        assert_eq!(id.raw(), (5u128 << 64) + 1234);

        let real: RoundId = "110680464442257320247".parse().unwrap();
        assert_eq!(real.phase_id(), 6);
        assert_eq!(real.aggregator_round_id(), 10551);
    }

    #[test]
    fn test_phase_change_is_a_different_round() {
        let a = RoundId::from_parts(1, 100);
        let b = RoundId::from_parts(2, 100);
        assert_ne!(a, b);
        assert_eq!(a.aggregator_round_id(), b.aggregator_round_id());
        assert!(!a.same_phase(&b));
    }

    #[test]
    fn test_round_id_string_round_trip() {
        let id = RoundId::from_parts(u16::MAX, u64::MAX);
        let text = id.to_string();
        assert_eq!(text.parse::<RoundId>().unwrap(), id);
        assert!("not-a-round".parse::<RoundId>().is_err());
    }

    #[test]
    fn test_staleness() {
        let snap = snapshot(1_000);
        assert_eq!(snap.staleness_seconds(1_600), Some(600));
        assert_eq!(snap.is_stale(1_600, DEFAULT_STALENESS_THRESHOLD_SECS), Some(false));
        assert_eq!(snap.is_stale(10_000, DEFAULT_STALENESS_THRESHOLD_SECS), Some(true));
        // Clock skew never yields a negative age
        assert_eq!(snap.staleness_seconds(500), Some(0));
    }

    #[test]
    fn test_never_answered_round() {
        let snap = snapshot(0);
        assert!(!snap.is_answered());
        assert_eq!(snap.staleness_seconds(1_600), None);
        assert_eq!(snap.is_stale(1_600, 60), None);
    }

    #[test]
    fn test_formatted_answer() {
        assert_eq!(snapshot(1).formatted_answer(), "2500.12345678");
    }
}
