//! Ledger client facade
//!
//! Every on-chain read the oracle engine performs goes through this trait so
//! pollers and readers can be exercised against an in-memory double.

use async_trait::async_trait;
use ethers::types::Address;
use num_bigint::BigInt;

use sentinel_core::{LogEntry, LogFilter, RoundData, RoundId};

use crate::Result;

/// Read-only access to oracle contracts on one network
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// `latestRoundData()` of an aggregator
    async fn read_latest_round(&self, feed: Address) -> Result<RoundData>;

    /// `getRoundData(roundId)` of an aggregator
    async fn read_round_by_id(&self, feed: Address, round_id: RoundId) -> Result<RoundData>;

    /// `decimals()` of an aggregator
    async fn read_decimals(&self, feed: Address) -> Result<u32>;

    /// `description()` of an aggregator, e.g. `ETH / USD`
    async fn read_description(&self, feed: Address) -> Result<String>;

    /// Decoded event logs in the inclusive block range `[from_block, to_block]`
    async fn query_logs(&self, filter: &LogFilter, from_block: u64, to_block: u64) -> Result<Vec<LogEntry>>;

    /// Timestamp of a block, `None` when the block is unknown
    async fn block_timestamp(&self, block_number: u64) -> Result<Option<u64>>;

    /// Latest block number
    async fn current_block_number(&self) -> Result<u64>;

    /// Feed registry `latestRoundData(base, quote)`
    async fn read_registry_latest_round(&self, registry: Address, base: Address, quote: Address) -> Result<RoundData>;

    /// Feed registry `decimals(base, quote)`
    async fn read_registry_decimals(&self, registry: Address, base: Address, quote: Address) -> Result<u32>;

    /// Feed registry `description(base, quote)`
    async fn read_registry_description(&self, registry: Address, base: Address, quote: Address) -> Result<String>;

    /// Aggregator behind a registry pair, `getFeed(base, quote)`
    async fn read_registry_feed(&self, registry: Address, base: Address, quote: Address) -> Result<Address>;

    /// ERC20 `balanceOf(holder)` in base units
    async fn read_token_balance(&self, token: Address, holder: Address) -> Result<BigInt>;

    /// ERC20 `allowance(owner, spender)` in base units
    async fn read_token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<BigInt>;

    /// ERC20 `totalSupply()` in base units
    async fn read_token_total_supply(&self, token: Address) -> Result<BigInt>;
}
