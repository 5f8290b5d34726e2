//! Utility functions shared across the sentinel crates

use chrono::{DateTime, SecondsFormat, Utc};
use ethers::types::Address;

use crate::{CoreError, Result};

/// Current wall-clock time as Unix seconds
pub fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Current wall-clock time as ISO-8601 with millisecond precision
pub fn now_iso() -> String {
    datetime_to_iso(Utc::now())
}

/// Convert a Unix timestamp to a DateTime<Utc>
pub fn timestamp_to_datetime(timestamp: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(timestamp).ok()?, 0)
}

/// Render a Unix timestamp as ISO-8601 with millisecond precision
pub fn timestamp_to_iso(timestamp: u64) -> String {
    timestamp_to_datetime(timestamp)
        .map(datetime_to_iso)
        .unwrap_or_else(|| timestamp.to_string())
}

/// Render a DateTime<Utc> as ISO-8601 with millisecond precision
pub fn datetime_to_iso(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validate an Ethereum address
pub fn is_valid_ethereum_address(address: &str) -> bool {
    if !address.starts_with("0x") {
        return false;
    }

    if address.len() != 42 {
        return false;
    }

    address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a hex address string
pub fn parse_address(address: &str) -> Result<Address> {
    let trimmed = address.trim();
    if !is_valid_ethereum_address(trimmed) {
        return Err(CoreError::InvalidAddress(address.to_string()));
    }
    trimmed
        .parse::<Address>()
        .map_err(|_| CoreError::InvalidAddress(address.to_string()))
}

/// Checksummed (EIP-55) rendering of an address
pub fn checksum_address(address: &Address) -> String {
    ethers::utils::to_checksum(address, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_iso() {
        assert_eq!(timestamp_to_iso(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(timestamp_to_iso(1_700_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address("0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419").unwrap();
        assert_eq!(
            checksum_address(&address),
            "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419"
        );
        assert!(parse_address("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419").is_err());
        assert!(parse_address("0x5f4eC3Df9cbd43714FE2740f5E3616155c5b84").is_err());
        assert!(parse_address("0xzz4eC3Df9cbd43714FE2740f5E3616155c5b8419").is_err());
    }
}
