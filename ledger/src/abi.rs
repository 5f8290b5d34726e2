//! Contract ABIs and encode/decode helpers
//!
//! Provides the oracle contract ABIs used by the facade and helpers that turn
//! raw call output and event logs into core types.

use ethers::abi::{Abi, Event, RawLog, Token};
use ethers::types::{Address, Bytes, Log, H256, U256};
use num_bigint::{BigInt, Sign};
use once_cell::sync::Lazy;
use serde_json::json;

use sentinel_core::{FulfillmentKind, LogEntry, RoundData, RoundId};

use crate::{LedgerError, Result};

/// AggregatorV3Interface ABI
pub static AGGREGATOR_V3_ABI: Lazy<Abi> = Lazy::new(|| {
    serde_json::from_value(json!([
        {
            "inputs": [],
            "name": "decimals",
            "outputs": [{"internalType": "uint8", "name": "", "type": "uint8"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "description",
            "outputs": [{"internalType": "string", "name": "", "type": "string"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "uint80", "name": "_roundId", "type": "uint80"}],
            "name": "getRoundData",
            "outputs": [
                {"internalType": "uint80", "name": "roundId", "type": "uint80"},
                {"internalType": "int256", "name": "answer", "type": "int256"},
                {"internalType": "uint256", "name": "startedAt", "type": "uint256"},
                {"internalType": "uint256", "name": "updatedAt", "type": "uint256"},
                {"internalType": "uint80", "name": "answeredInRound", "type": "uint80"}
            ],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "latestRoundData",
            "outputs": [
                {"internalType": "uint80", "name": "roundId", "type": "uint80"},
                {"internalType": "int256", "name": "answer", "type": "int256"},
                {"internalType": "uint256", "name": "startedAt", "type": "uint256"},
                {"internalType": "uint256", "name": "updatedAt", "type": "uint256"},
                {"internalType": "uint80", "name": "answeredInRound", "type": "uint80"}
            ],
            "stateMutability": "view",
            "type": "function"
        }
    ]))
    .expect("Valid AggregatorV3 ABI")
});

/// Feed registry ABI; every read is keyed by a `(base, quote)` denomination pair
pub static FEED_REGISTRY_ABI: Lazy<Abi> = Lazy::new(|| {
    serde_json::from_value(json!([
        {
            "inputs": [
                {"internalType": "address", "name": "base", "type": "address"},
                {"internalType": "address", "name": "quote", "type": "address"}
            ],
            "name": "decimals",
            "outputs": [{"internalType": "uint8", "name": "", "type": "uint8"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "base", "type": "address"},
                {"internalType": "address", "name": "quote", "type": "address"}
            ],
            "name": "description",
            "outputs": [{"internalType": "string", "name": "", "type": "string"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "base", "type": "address"},
                {"internalType": "address", "name": "quote", "type": "address"}
            ],
            "name": "getFeed",
            "outputs": [{"internalType": "address", "name": "aggregator", "type": "address"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "base", "type": "address"},
                {"internalType": "address", "name": "quote", "type": "address"}
            ],
            "name": "latestRoundData",
            "outputs": [
                {"internalType": "uint80", "name": "roundId", "type": "uint80"},
                {"internalType": "int256", "name": "answer", "type": "int256"},
                {"internalType": "uint256", "name": "startedAt", "type": "uint256"},
                {"internalType": "uint256", "name": "updatedAt", "type": "uint256"},
                {"internalType": "uint80", "name": "answeredInRound", "type": "uint80"}
            ],
            "stateMutability": "view",
            "type": "function"
        }
    ]))
    .expect("Valid feed registry ABI")
});

/// VRF coordinator ABI (fulfillment event only)
pub static VRF_COORDINATOR_ABI: Lazy<Abi> = Lazy::new(|| {
    serde_json::from_value(json!([
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "requestId", "type": "uint256"},
                {"indexed": false, "internalType": "uint256[]", "name": "randomWords", "type": "uint256[]"}
            ],
            "name": "RandomWordsFulfilled",
            "type": "event"
        }
    ]))
    .expect("Valid VRF coordinator ABI")
});

/// Automation registry ABI (perform event only)
pub static AUTOMATION_REGISTRY_ABI: Lazy<Abi> = Lazy::new(|| {
    serde_json::from_value(json!([
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "uint256", "name": "id", "type": "uint256"},
                {"indexed": true, "internalType": "bool", "name": "success", "type": "bool"},
                {"indexed": false, "internalType": "uint96", "name": "totalPayment", "type": "uint96"},
                {"indexed": false, "internalType": "uint256", "name": "gasUsed", "type": "uint256"},
                {"indexed": false, "internalType": "uint256", "name": "gasOverhead", "type": "uint256"},
                {"indexed": false, "internalType": "bytes", "name": "trigger", "type": "bytes"}
            ],
            "name": "UpkeepPerformed",
            "type": "event"
        }
    ]))
    .expect("Valid automation registry ABI")
});

/// ERC20 contract ABI
pub static ERC20_ABI: Lazy<Abi> = Lazy::new(|| {
    serde_json::from_value(json!([
        {
            "constant": true,
            "inputs": [{"name": "_owner", "type": "address"}],
            "name": "balanceOf",
            "outputs": [{"name": "balance", "type": "uint256"}],
            "type": "function"
        },
        {
            "constant": true,
            "inputs": [
                {"name": "_owner", "type": "address"},
                {"name": "_spender", "type": "address"}
            ],
            "name": "allowance",
            "outputs": [{"name": "", "type": "uint256"}],
            "type": "function"
        },
        {
            "constant": true,
            "inputs": [],
            "name": "totalSupply",
            "outputs": [{"name": "", "type": "uint256"}],
            "type": "function"
        }
    ]))
    .expect("Valid ERC20 ABI")
});

/// ABI manager for encoding/decoding oracle contract calls
pub struct AbiManager;

impl AbiManager {
    /// Encode a function call
    pub fn encode_function_call(abi: &Abi, function_name: &str, params: &[Token]) -> Result<Bytes> {
        let function = abi.function(function_name).map_err(|e| {
            LedgerError::encode(format!("Function {} not found in ABI: {}", function_name, e))
        })?;

        let encoded = function
            .encode_input(params)
            .map_err(|e| LedgerError::encode(format!("Failed to encode {}: {}", function_name, e)))?;

        Ok(Bytes::from(encoded))
    }

    /// Decode function output
    pub fn decode_function_output(abi: &Abi, function_name: &str, output: &[u8]) -> Result<Vec<Token>> {
        let function = abi.function(function_name).map_err(|e| {
            LedgerError::decode(format!("Function {} not found in ABI: {}", function_name, e))
        })?;

        function.decode_output(output).map_err(|e| {
            LedgerError::decode(format!("Failed to decode {} output: {}", function_name, e))
        })
    }

    /// Encode latestRoundData()
    pub fn encode_latest_round_data_call() -> Result<Bytes> {
        Self::encode_function_call(&AGGREGATOR_V3_ABI, "latestRoundData", &[])
    }

    /// Encode getRoundData(uint80)
    pub fn encode_get_round_data_call(round_id: RoundId) -> Result<Bytes> {
        Self::encode_function_call(
            &AGGREGATOR_V3_ABI,
            "getRoundData",
            &[Token::Uint(U256::from(round_id.raw()))],
        )
    }

    /// Decode latestRoundData() / getRoundData() output
    pub fn decode_round_data_output(function_name: &str, output: &[u8]) -> Result<RoundData> {
        let tokens = Self::decode_function_output(&AGGREGATOR_V3_ABI, function_name, output)?;
        round_from_tokens(function_name, tokens)
    }

    /// Encode a feed registry call taking `(base, quote)`
    pub fn encode_registry_call(function_name: &str, base: Address, quote: Address) -> Result<Bytes> {
        Self::encode_function_call(
            &FEED_REGISTRY_ABI,
            function_name,
            &[Token::Address(base), Token::Address(quote)],
        )
    }

    /// Decode feed registry latestRoundData(base, quote) output
    pub fn decode_registry_round_data_output(output: &[u8]) -> Result<RoundData> {
        let tokens = Self::decode_function_output(&FEED_REGISTRY_ABI, "latestRoundData", output)?;
        round_from_tokens("latestRoundData", tokens)
    }

    /// Decode feed registry decimals(base, quote) output
    pub fn decode_registry_decimals_output(output: &[u8]) -> Result<u32> {
        let tokens = Self::decode_function_output(&FEED_REGISTRY_ABI, "decimals", output)?;
        let value = single_token(tokens, "decimals")?;
        Ok(token_to_u64(&value, "decimals")? as u32)
    }

    /// Decode feed registry description(base, quote) output
    pub fn decode_registry_description_output(output: &[u8]) -> Result<String> {
        let tokens = Self::decode_function_output(&FEED_REGISTRY_ABI, "description", output)?;
        token_to_string(single_token(tokens, "description")?, "description")
    }

    /// Decode feed registry getFeed(base, quote) output
    pub fn decode_registry_feed_output(output: &[u8]) -> Result<Address> {
        let tokens = Self::decode_function_output(&FEED_REGISTRY_ABI, "getFeed", output)?;
        match single_token(tokens, "getFeed")? {
            Token::Address(address) => Ok(address),
            other => Err(LedgerError::decode(format!("getFeed: expected address, got {:?}", other))),
        }
    }


    /// Encode decimals()
    pub fn encode_decimals_call() -> Result<Bytes> {
        Self::encode_function_call(&AGGREGATOR_V3_ABI, "decimals", &[])
    }

    /// Decode decimals() output
    pub fn decode_decimals_output(output: &[u8]) -> Result<u32> {
        let tokens = Self::decode_function_output(&AGGREGATOR_V3_ABI, "decimals", output)?;
        let value = single_token(tokens, "decimals")?;
        Ok(token_to_u64(&value, "decimals")? as u32)
    }

    /// Encode description()
    pub fn encode_description_call() -> Result<Bytes> {
        Self::encode_function_call(&AGGREGATOR_V3_ABI, "description", &[])
    }

    /// Decode description() output
    pub fn decode_description_output(output: &[u8]) -> Result<String> {
        let tokens = Self::decode_function_output(&AGGREGATOR_V3_ABI, "description", output)?;
        token_to_string(single_token(tokens, "description")?, "description")
    }

    /// Encode balanceOf(address)
    pub fn encode_balance_of_call(holder: Address) -> Result<Bytes> {
        Self::encode_function_call(&ERC20_ABI, "balanceOf", &[Token::Address(holder)])
    }

    /// Encode allowance(owner, spender)
    pub fn encode_allowance_call(owner: Address, spender: Address) -> Result<Bytes> {
        Self::encode_function_call(
            &ERC20_ABI,
            "allowance",
            &[Token::Address(owner), Token::Address(spender)],
        )
    }

    /// Encode totalSupply()
    pub fn encode_total_supply_call() -> Result<Bytes> {
        Self::encode_function_call(&ERC20_ABI, "totalSupply", &[])
    }

    /// Decode a single-uint256 ERC20 read such as balanceOf(), allowance() or totalSupply()
    pub fn decode_erc20_amount_output(function_name: &str, output: &[u8]) -> Result<BigInt> {
        let tokens = Self::decode_function_output(&ERC20_ABI, function_name, output)?;
        match single_token(tokens, function_name)? {
            Token::Uint(value) => Ok(u256_to_bigint(value)),
            other => Err(LedgerError::decode(format!(
                "{}: expected uint256, got {:?}",
                function_name, other
            ))),
        }
    }

    /// ABI event definition for a fulfillment kind
    pub fn event(kind: FulfillmentKind) -> Result<&'static Event> {
        let abi: &'static Abi = match kind {
            FulfillmentKind::RandomWordsFulfilled => &VRF_COORDINATOR_ABI,
            FulfillmentKind::UpkeepPerformed => &AUTOMATION_REGISTRY_ABI,
        };

        abi.event(kind.event_name()).map_err(|e| {
            LedgerError::decode(format!("Event {} not found in ABI: {}", kind.event_name(), e))
        })
    }

    /// Event signature hash (topic 0)
    pub fn event_topic(kind: FulfillmentKind) -> Result<H256> {
        Ok(Self::event(kind)?.signature())
    }

    /// Decode a raw log into a [`LogEntry`]
    pub fn decode_log(kind: FulfillmentKind, log: &Log) -> Result<LogEntry> {
        let event = Self::event(kind)?;
        let parsed = event
            .parse_log(RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            })
            .map_err(|e| LedgerError::decode(format!("Failed to decode {} log: {}", kind, e)))?;

        let block_number = log
            .block_number
            .ok_or_else(|| LedgerError::decode(format!("{} log without block number", kind)))?
            .as_u64();
        let transaction_hash = log
            .transaction_hash
            .ok_or_else(|| LedgerError::decode(format!("{} log without transaction hash", kind)))?;
        let log_index = log.log_index.map(|index| index.low_u64()).unwrap_or_default();

        let entry = parsed.params.into_iter().fold(
            LogEntry::new(block_number, transaction_hash, log_index),
            |entry, param| entry.with_arg(param.name, param.value),
        );

        Ok(entry)
    }
}

fn round_from_tokens(function_name: &str, tokens: Vec<Token>) -> Result<RoundData> {
    if tokens.len() != 5 {
        return Err(LedgerError::decode(format!(
            "{} returned {} values, expected 5",
            function_name,
            tokens.len()
        )));
    }

    Ok(RoundData {
        round_id: RoundId::new(token_to_u128(&tokens[0], "roundId")?),
        answer: token_to_signed(&tokens[1], "answer")?,
        started_at: token_to_u64(&tokens[2], "startedAt")?,
        updated_at: token_to_u64(&tokens[3], "updatedAt")?,
        answered_in_round: RoundId::new(token_to_u128(&tokens[4], "answeredInRound")?),
    })
}

fn token_to_string(token: Token, field: &str) -> Result<String> {
    match token {
        Token::String(text) => Ok(text),
        other => Err(LedgerError::decode(format!("{}: expected string, got {:?}", field, other))),
    }
}

fn single_token(tokens: Vec<Token>, field: &str) -> Result<Token> {
    let mut iter = tokens.into_iter();
    match (iter.next(), iter.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(LedgerError::decode(format!("{}: expected a single value", field))),
    }
}

/// Unsigned 256-bit value as a big integer
pub fn u256_to_bigint(value: U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

/// Two's-complement 256-bit value as a signed big integer
pub fn i256_to_bigint(value: U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_signed_bytes_be(&bytes)
}

fn token_to_signed(token: &Token, field: &str) -> Result<BigInt> {
    match token {
        Token::Int(value) => Ok(i256_to_bigint(*value)),
        Token::Uint(value) => Ok(u256_to_bigint(*value)),
        other => Err(LedgerError::decode(format!("{}: expected integer, got {:?}", field, other))),
    }
}

fn token_to_u128(token: &Token, field: &str) -> Result<u128> {
    match token {
        Token::Uint(value) if value.bits() <= 128 => Ok(value.as_u128()),
        Token::Uint(value) => Err(LedgerError::decode(format!("{}: {} exceeds 128 bits", field, value))),
        other => Err(LedgerError::decode(format!("{}: expected uint, got {:?}", field, other))),
    }
}

fn token_to_u64(token: &Token, field: &str) -> Result<u64> {
    match token {
        Token::Uint(value) if value.bits() <= 64 => Ok(value.as_u64()),
        Token::Uint(value) => Err(LedgerError::decode(format!("{}: {} exceeds 64 bits", field, value))),
        other => Err(LedgerError::decode(format!("{}: expected uint, got {:?}", field, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::encode;
    use ethers::types::U64;

    fn round_output(round: u128, answer: i128, started: u64, updated: u64) -> Vec<u8> {
        let answer = if answer < 0 {
            // two's complement
            !U256::from(answer.unsigned_abs()) + U256::one()
        } else {
            U256::from(answer as u128)
        };
        encode(&[
            Token::Uint(U256::from(round)),
            Token::Int(answer),
            Token::Uint(U256::from(started)),
            Token::Uint(U256::from(updated)),
            Token::Uint(U256::from(round)),
        ])
    }

    #[test]
    fn test_decode_latest_round_data() {
        let round_id = RoundId::from_parts(6, 10551);
        let output = round_output(round_id.raw(), 250_012_345_678, 1_700_000_000, 1_700_000_012);
        let round = AbiManager::decode_round_data_output("latestRoundData", &output).unwrap();

        assert_eq!(round.round_id, round_id);
        assert_eq!(round.answer, BigInt::from(250_012_345_678i64));
        assert_eq!(round.started_at, 1_700_000_000);
        assert_eq!(round.updated_at, 1_700_000_012);
        assert_eq!(round.answered_in_round, round_id);
    }

    #[test]
    fn test_decode_negative_answer() {
        let output = round_output(1, -42, 1, 1);
        let round = AbiManager::decode_round_data_output("latestRoundData", &output).unwrap();
        assert_eq!(round.answer, BigInt::from(-42));
    }

    #[test]
    fn test_decode_truncated_output_fails() {
        let output = round_output(1, 1, 1, 1);
        let err = AbiManager::decode_round_data_output("latestRoundData", &output[..64]).unwrap_err();
        assert!(matches!(err, LedgerError::Decode { .. }));
    }

    #[test]
    fn test_decode_description_and_decimals() {
        let description = encode(&[Token::String("ETH / USD".to_string())]);
        assert_eq!(AbiManager::decode_description_output(&description).unwrap(), "ETH / USD");

        let decimals = encode(&[Token::Uint(U256::from(8))]);
        assert_eq!(AbiManager::decode_decimals_output(&decimals).unwrap(), 8);
    }

    #[test]
    fn test_encode_calls_use_selectors() {
        let latest = AbiManager::encode_latest_round_data_call().unwrap();
        assert_eq!(&latest[..4], &[0xfe, 0xaf, 0x96, 0x8c]);

        let by_id = AbiManager::encode_get_round_data_call(RoundId::new(5)).unwrap();
        assert_eq!(&by_id[..4], &[0x9a, 0x6f, 0xc8, 0xf5]);
        assert_eq!(by_id.len(), 36);
    }

    #[test]
    fn test_decode_vrf_log() {
        let topic = AbiManager::event_topic(FulfillmentKind::RandomWordsFulfilled).unwrap();
        let mut request_id = [0u8; 32];
        U256::from(77).to_big_endian(&mut request_id);

        let log = Log {
            topics: vec![topic, H256::from(request_id)],
            data: encode(&[Token::Array(vec![
                Token::Uint(U256::from(11)),
                Token::Uint(U256::from(22)),
            ])])
            .into(),
            block_number: Some(U64::from(1_000)),
            transaction_hash: Some(H256::repeat_byte(0x11)),
            log_index: Some(U256::from(2)),
            ..Default::default()
        };

        let entry = AbiManager::decode_log(FulfillmentKind::RandomWordsFulfilled, &log).unwrap();
        assert_eq!(entry.block_number, 1_000);
        assert_eq!(entry.log_index, 2);
        assert_eq!(entry.uint_arg("requestId"), Some(U256::from(77)));
        assert_eq!(
            entry.uint_array_arg("randomWords"),
            Some(vec![U256::from(11), U256::from(22)])
        );
    }

    #[test]
    fn test_registry_calls_carry_denominations() {
        let base = Address::repeat_byte(0xee);
        let quote = Address::from_low_u64_be(0x348);

        let call = AbiManager::encode_registry_call("latestRoundData", base, quote).unwrap();
        assert_eq!(call.len(), 4 + 64);
        assert_eq!(&call[4 + 12..4 + 32], base.as_bytes());
        assert_eq!(&call[4 + 32 + 12..], quote.as_bytes());

        let output = round_output(9, 300_000_000_000, 1_700_000_000, 1_700_000_100);
        let round = AbiManager::decode_registry_round_data_output(&output).unwrap();
        assert_eq!(round.round_id, RoundId::new(9));
        assert_eq!(round.answer, BigInt::from(300_000_000_000i64));

        let feed = encode(&[Token::Address(Address::repeat_byte(0x5f))]);
        assert_eq!(
            AbiManager::decode_registry_feed_output(&feed).unwrap(),
            Address::repeat_byte(0x5f)
        );
    }

    #[test]
    fn test_erc20_amount_reads() {
        let allowance = AbiManager::encode_allowance_call(Address::repeat_byte(1), Address::repeat_byte(2)).unwrap();
        assert_eq!(&allowance[..4], &[0xdd, 0x62, 0xed, 0x3e]);

        let supply = AbiManager::encode_total_supply_call().unwrap();
        assert_eq!(&supply[..], &[0x18, 0x16, 0x0d, 0xdd]);

        let output = encode(&[Token::Uint(U256::MAX)]);
        let amount = AbiManager::decode_erc20_amount_output("allowance", &output).unwrap();
        assert_eq!(amount, u256_to_bigint(U256::MAX));
    }

    #[test]
    fn test_abis_only_carry_used_functions() {
        assert!(AGGREGATOR_V3_ABI.function("version").is_err());
        assert!(ERC20_ABI.function("decimals").is_err());
        assert!(ERC20_ABI.function("totalSupply").is_ok());
    }

    #[test]
    fn test_signed_conversion() {
        assert_eq!(i256_to_bigint(U256::MAX), BigInt::from(-1));
        assert_eq!(u256_to_bigint(U256::MAX).bits(), 256);
    }
}
