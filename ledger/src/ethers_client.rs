//! `LedgerClient` over an ethers HTTP provider

use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockNumber, Bytes, Filter, NameOrAddress, H256};
use num_bigint::BigInt;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use sentinel_core::{LogEntry, LogFilter, RoundData, RoundId};

use crate::abi::AbiManager;
use crate::client::LedgerClient;
use crate::{LedgerError, Result};

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC backed ledger client
#[derive(Debug, Clone)]
pub struct EthersLedgerClient {
    /// Underlying provider; owns connection reuse
    provider: Provider<Http>,

    /// Endpoint, kept for log context
    rpc_url: String,
}

impl EthersLedgerClient {
    /// Create a new client for an HTTP(S) endpoint
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        info!(url = rpc_url, timeout_secs = timeout.as_secs(), "Initializing ledger client");

        let url = Url::parse(rpc_url)
            .map_err(|e| LedgerError::invalid_endpoint(rpc_url.to_string(), e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build().map_err(|e| {
            LedgerError::invalid_endpoint(rpc_url.to_string(), format!("Failed to create HTTP client: {}", e))
        })?;

        let provider = Provider::<Http>::new(Http::new_with_client(url, http_client));

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// RPC endpoint this client talks to
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// `eth_call` against a contract, mapping reverts and empty code to `FeedUnavailable`
    async fn call(&self, to: Address, calldata: Bytes, function: &str) -> Result<Bytes> {
        let mut tx = TypedTransaction::default();
        tx.set_to(NameOrAddress::Address(to));
        tx.set_data(calldata);

        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| classify_call_error(to, function, e))?;

        if output.is_empty() {
            warn!(contract = %to, function, "Call returned no data");
            return Err(LedgerError::feed_unavailable(
                format!("{:?}", to),
                format!("{} returned no data (no contract code?)", function),
            ));
        }

        Ok(output)
    }
}

fn classify_call_error(to: Address, function: &str, err: ProviderError) -> LedgerError {
    let message = err.to_string();
    if message.to_lowercase().contains("revert") {
        warn!(contract = %to, function, error = %message, "Contract call reverted");
        LedgerError::feed_unavailable(format!("{:?}", to), format!("{} reverted: {}", function, message))
    } else {
        LedgerError::Transport(err)
    }
}

fn uint_topic(value: ethers::types::U256) -> H256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    H256::from(bytes)
}

#[async_trait]
impl LedgerClient for EthersLedgerClient {
    async fn read_latest_round(&self, feed: Address) -> Result<RoundData> {
        let calldata = AbiManager::encode_latest_round_data_call()?;
        let output = self.call(feed, calldata, "latestRoundData").await?;
        let round = AbiManager::decode_round_data_output("latestRoundData", &output)?;

        debug!(
            feed = %feed,
            round_id = %round.round_id,
            answer = %round.answer,
            updated_at = round.updated_at,
            "Retrieved latest round"
        );

        Ok(round)
    }

    async fn read_round_by_id(&self, feed: Address, round_id: RoundId) -> Result<RoundData> {
        let calldata = AbiManager::encode_get_round_data_call(round_id)?;
        let output = self.call(feed, calldata, "getRoundData").await?;
        let round = AbiManager::decode_round_data_output("getRoundData", &output)?;

        debug!(feed = %feed, round_id = %round_id, "Retrieved historical round");
        Ok(round)
    }

    async fn read_decimals(&self, feed: Address) -> Result<u32> {
        let calldata = AbiManager::encode_decimals_call()?;
        let output = self.call(feed, calldata, "decimals").await?;
        AbiManager::decode_decimals_output(&output)
    }

    async fn read_description(&self, feed: Address) -> Result<String> {
        let calldata = AbiManager::encode_description_call()?;
        let output = self.call(feed, calldata, "description").await?;
        AbiManager::decode_description_output(&output)
    }

    async fn query_logs(&self, filter: &LogFilter, from_block: u64, to_block: u64) -> Result<Vec<LogEntry>> {
        let topic = AbiManager::event_topic(filter.kind)?;

        let mut query = Filter::new()
            .address(filter.address)
            .topic0(topic)
            .from_block(BlockNumber::Number(from_block.into()))
            .to_block(BlockNumber::Number(to_block.into()));
        if let Some(id) = filter.indexed_id {
            query = query.topic1(uint_topic(id));
        }

        let logs = self.provider.get_logs(&query).await?;

        debug!(
            contract = %filter.address,
            event = %filter.kind,
            from_block,
            to_block,
            count = logs.len(),
            "Queried event logs"
        );

        logs.iter()
            .map(|log| AbiManager::decode_log(filter.kind, log))
            .collect()
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<Option<u64>> {
        let block = self.provider.get_block(block_number).await?;
        Ok(block.map(|block| block.timestamp.low_u64()))
    }

    async fn current_block_number(&self) -> Result<u64> {
        let block_number = self.provider.get_block_number().await?;
        Ok(block_number.as_u64())
    }

    async fn read_registry_latest_round(&self, registry: Address, base: Address, quote: Address) -> Result<RoundData> {
        let calldata = AbiManager::encode_registry_call("latestRoundData", base, quote)?;
        let output = self.call(registry, calldata, "latestRoundData").await?;
        let round = AbiManager::decode_registry_round_data_output(&output)?;

        debug!(
            registry = %registry,
            base = %base,
            quote = %quote,
            round_id = %round.round_id,
            "Retrieved registry round"
        );

        Ok(round)
    }

    async fn read_registry_decimals(&self, registry: Address, base: Address, quote: Address) -> Result<u32> {
        let calldata = AbiManager::encode_registry_call("decimals", base, quote)?;
        let output = self.call(registry, calldata, "decimals").await?;
        AbiManager::decode_registry_decimals_output(&output)
    }

    async fn read_registry_description(&self, registry: Address, base: Address, quote: Address) -> Result<String> {
        let calldata = AbiManager::encode_registry_call("description", base, quote)?;
        let output = self.call(registry, calldata, "description").await?;
        AbiManager::decode_registry_description_output(&output)
    }

    async fn read_registry_feed(&self, registry: Address, base: Address, quote: Address) -> Result<Address> {
        let calldata = AbiManager::encode_registry_call("getFeed", base, quote)?;
        let output = self.call(registry, calldata, "getFeed").await?;
        AbiManager::decode_registry_feed_output(&output)
    }

    async fn read_token_balance(&self, token: Address, holder: Address) -> Result<BigInt> {
        let calldata = AbiManager::encode_balance_of_call(holder)?;
        let output = self.call(token, calldata, "balanceOf").await?;
        AbiManager::decode_erc20_amount_output("balanceOf", &output)
    }

    async fn read_token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<BigInt> {
        let calldata = AbiManager::encode_allowance_call(owner, spender)?;
        let output = self.call(token, calldata, "allowance").await?;
        AbiManager::decode_erc20_amount_output("allowance", &output)
    }

    async fn read_token_total_supply(&self, token: Address) -> Result<BigInt> {
        let calldata = AbiManager::encode_total_supply_call()?;
        let output = self.call(token, calldata, "totalSupply").await?;
        AbiManager::decode_erc20_amount_output("totalSupply", &output)
    }
}
