//! Log query types shared between the ledger facade and the trigger scanners

use std::collections::BTreeMap;
use std::fmt;

use ethers::abi::Token;
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

/// Fulfillment-style contract events the scanners look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentKind {
    /// VRF coordinator `RandomWordsFulfilled`
    RandomWordsFulfilled,
    /// Automation registry `UpkeepPerformed`
    UpkeepPerformed,
}

impl FulfillmentKind {
    /// ABI event name
    pub fn event_name(&self) -> &'static str {
        match self {
            FulfillmentKind::RandomWordsFulfilled => "RandomWordsFulfilled",
            FulfillmentKind::UpkeepPerformed => "UpkeepPerformed",
        }
    }

    /// Service that emits this event
    pub fn service(&self) -> &'static str {
        match self {
            FulfillmentKind::RandomWordsFulfilled => "VRF",
            FulfillmentKind::UpkeepPerformed => "Automation",
        }
    }
}

impl fmt::Display for FulfillmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Event-log query against one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub kind: FulfillmentKind,
    /// Value for the first indexed argument, when filtering on it
    pub indexed_id: Option<U256>,
}

impl LogFilter {
    pub fn new(address: Address, kind: FulfillmentKind) -> Self {
        Self {
            address,
            kind,
            indexed_id: None,
        }
    }

    pub fn with_indexed_id(mut self, id: U256) -> Self {
        self.indexed_id = Some(id);
        self
    }
}

/// A decoded contract event
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub block_number: u64,
    pub transaction_hash: H256,
    pub log_index: u64,
    pub args: BTreeMap<String, Token>,
}

impl LogEntry {
    pub fn new(block_number: u64, transaction_hash: H256, log_index: u64) -> Self {
        Self {
            block_number,
            transaction_hash,
            log_index,
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg<S: Into<String>>(mut self, name: S, value: Token) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    pub fn uint_arg(&self, name: &str) -> Option<U256> {
        match self.args.get(name)? {
            Token::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn bool_arg(&self, name: &str) -> Option<bool> {
        match self.args.get(name)? {
            Token::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn uint_array_arg(&self, name: &str) -> Option<Vec<U256>> {
        match self.args.get(name)? {
            Token::Array(items) => items
                .iter()
                .map(|item| match item {
                    Token::Uint(value) => Some(*value),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Transaction hash as 0x-prefixed hex
    pub fn transaction_hash_hex(&self) -> String {
        format!("{:?}", self.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_args() {
        let entry = LogEntry::new(100, H256::repeat_byte(0xab), 3)
            .with_arg("requestId", Token::Uint(U256::from(7)))
            .with_arg("success", Token::Bool(true))
            .with_arg(
                "randomWords",
                Token::Array(vec![Token::Uint(U256::from(1)), Token::Uint(U256::from(2))]),
            );

        assert_eq!(entry.uint_arg("requestId"), Some(U256::from(7)));
        assert_eq!(entry.bool_arg("success"), Some(true));
        assert_eq!(
            entry.uint_array_arg("randomWords"),
            Some(vec![U256::from(1), U256::from(2)])
        );
        assert_eq!(entry.uint_arg("success"), None);
        assert_eq!(entry.uint_arg("missing"), None);
        assert!(entry.transaction_hash_hex().starts_with("0xabab"));
    }
}
