//! Feed reader tests against an in-memory ledger

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::Address;
use num_bigint::BigInt;

use sentinel_core::catalog::DataFeedKind;
use sentinel_core::{CoreError, LogEntry, LogFilter, Network, RoundData, RoundId};
use sentinel_ledger::reader::BatchPriceItem;
use sentinel_ledger::{FeedReader, LedgerClient, LedgerError, Result};

#[derive(Clone)]
struct Feed {
    round: RoundData,
    decimals: u32,
    description: String,
}

#[derive(Default)]
struct InMemoryLedger {
    feeds: HashMap<Address, Feed>,
    history: HashMap<(Address, RoundId), RoundData>,
    balances: HashMap<(Address, Address), BigInt>,
    allowances: HashMap<(Address, Address, Address), BigInt>,
    supplies: HashMap<Address, BigInt>,
    /// Registry pairs: (registry, base, quote) -> aggregator
    registry: HashMap<(Address, Address, Address), Address>,
}

impl InMemoryLedger {
    fn with_feed(mut self, feed: Address, answer: i64, decimals: u32, description: &str) -> Self {
        self.feeds.insert(
            feed,
            Feed {
                round: round(RoundId::from_parts(3, 100), answer, 1_700_000_000),
                decimals,
                description: description.to_string(),
            },
        );
        self
    }

    fn registry_feed(&self, registry: Address, base: Address, quote: Address) -> Result<&Feed> {
        let feed = self
            .registry
            .get(&(registry, base, quote))
            .ok_or_else(|| LedgerError::feed_unavailable(format!("{:?}", registry), "Feed not found"))?;
        self.feed(*feed)
    }

    fn feed(&self, feed: Address) -> Result<&Feed> {
        self.feeds
            .get(&feed)
            .ok_or_else(|| LedgerError::feed_unavailable(format!("{:?}", feed), "execution reverted"))
    }
}

fn round(round_id: RoundId, answer: i64, updated_at: u64) -> RoundData {
    RoundData {
        round_id,
        answer: BigInt::from(answer),
        started_at: updated_at,
        updated_at,
        answered_in_round: round_id,
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn read_latest_round(&self, feed: Address) -> Result<RoundData> {
        Ok(self.feed(feed)?.round.clone())
    }

    async fn read_round_by_id(&self, feed: Address, round_id: RoundId) -> Result<RoundData> {
        self.history
            .get(&(feed, round_id))
            .cloned()
            .ok_or_else(|| LedgerError::feed_unavailable(format!("{:?}", feed), "No data present"))
    }

    async fn read_decimals(&self, feed: Address) -> Result<u32> {
        Ok(self.feed(feed)?.decimals)
    }

    async fn read_description(&self, feed: Address) -> Result<String> {
        Ok(self.feed(feed)?.description.clone())
    }

    async fn query_logs(&self, _filter: &LogFilter, _from: u64, _to: u64) -> Result<Vec<LogEntry>> {
        Ok(Vec::new())
    }

    async fn block_timestamp(&self, _block_number: u64) -> Result<Option<u64>> {
        Ok(None)
    }

    async fn current_block_number(&self) -> Result<u64> {
        Ok(0)
    }

    async fn read_registry_latest_round(&self, registry: Address, base: Address, quote: Address) -> Result<RoundData> {
        Ok(self.registry_feed(registry, base, quote)?.round.clone())
    }

    async fn read_registry_decimals(&self, registry: Address, base: Address, quote: Address) -> Result<u32> {
        Ok(self.registry_feed(registry, base, quote)?.decimals)
    }

    async fn read_registry_description(&self, registry: Address, base: Address, quote: Address) -> Result<String> {
        Ok(self.registry_feed(registry, base, quote)?.description.clone())
    }

    async fn read_registry_feed(&self, registry: Address, base: Address, quote: Address) -> Result<Address> {
        self.registry
            .get(&(registry, base, quote))
            .copied()
            .ok_or_else(|| LedgerError::feed_unavailable(format!("{:?}", registry), "Feed not found"))
    }

    async fn read_token_balance(&self, token: Address, holder: Address) -> Result<BigInt> {
        Ok(self.balances.get(&(token, holder)).cloned().unwrap_or_default())
    }

    async fn read_token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<BigInt> {
        Ok(self.allowances.get(&(token, owner, spender)).cloned().unwrap_or_default())
    }

    async fn read_token_total_supply(&self, token: Address) -> Result<BigInt> {
        Ok(self.supplies.get(&token).cloned().unwrap_or_default())
    }
}

fn link() -> Address {
    "0x514910771AF9Ca656af840dff83E8264EcF986CA".parse().unwrap()
}

fn eth_usd() -> Address {
    Address::repeat_byte(0x01)
}

fn eur_usd() -> Address {
    Address::repeat_byte(0x02)
}

fn reader(ledger: InMemoryLedger) -> FeedReader<InMemoryLedger> {
    FeedReader::new(Arc::new(ledger), Network::EthereumMainnet)
}

#[tokio::test]
async fn test_latest_price_formats_answer() -> Result<()> {
    let reader = reader(InMemoryLedger::default().with_feed(eth_usd(), 250_012_345_678, 8, "ETH / USD"));

    let report = reader.latest_price(eth_usd()).await?;
    assert_eq!(report.price, "2500.12345678");
    assert_eq!(report.raw_price, "250012345678");
    assert_eq!(report.pair, "ETH / USD");
    assert_eq!(report.round_id, RoundId::from_parts(3, 100).to_string());
    assert_eq!(report.updated_at, "2023-11-14T22:13:20.000Z");
    assert_eq!(report.network, "ethereum-mainnet");
    assert!(report.timestamp.is_some());

    Ok(())
}

#[tokio::test]
async fn test_feed_data_reports_staleness_and_phase() -> Result<()> {
    let reader = reader(InMemoryLedger::default().with_feed(eth_usd(), 1, 8, "ETH / USD"));

    let fresh = reader.feed_data(eth_usd(), 1_700_000_600).await?;
    assert_eq!(fresh.phase_id, "3");
    assert_eq!(fresh.aggregator_round_id, "100");
    assert_eq!(fresh.staleness_seconds, Some(600));
    assert_eq!(fresh.is_stale, Some(false));

    let stale = reader.feed_data(eth_usd(), 1_700_010_000).await?;
    assert_eq!(stale.is_stale, Some(true));

    Ok(())
}

#[tokio::test]
async fn test_historical_price_reads_requested_round() -> Result<()> {
    let mut ledger = InMemoryLedger::default().with_feed(eth_usd(), 1, 8, "ETH / USD");
    let old_round = RoundId::from_parts(3, 42);
    ledger
        .history
        .insert((eth_usd(), old_round), round(old_round, 180_000_000_000, 1_600_000_000));
    let reader = reader(ledger);

    let report = reader.historical_price(eth_usd(), old_round).await?;
    assert_eq!(report.price, "1800.00000000");
    assert_eq!(report.round_id, old_round.to_string());
    assert!(report.timestamp.is_none());

    let missing = reader.historical_price(eth_usd(), RoundId::from_parts(3, 7)).await;
    assert!(matches!(missing, Err(LedgerError::FeedUnavailable { .. })));

    Ok(())
}

#[tokio::test]
async fn test_feed_description_splits_assets() -> Result<()> {
    let reader = reader(InMemoryLedger::default().with_feed(eur_usd(), 1, 8, "EUR / USD"));

    let description = reader.feed_description(eur_usd()).await?;
    assert_eq!(description.base_asset, "EUR");
    assert_eq!(description.quote_asset, "USD");
    assert_eq!(description.decimals, 8);

    Ok(())
}

#[tokio::test]
async fn test_batch_prices_degrade_per_item() {
    let reader = reader(InMemoryLedger::default().with_feed(eth_usd(), 300_000_000_000, 8, "ETH / USD"));
    let missing = Address::repeat_byte(0x09);

    let report = reader.batch_prices(&[eth_usd(), missing]).await;
    assert_eq!(report.total_feeds, 2);
    assert_eq!(report.successful_feeds, 1);
    assert!(matches!(&report.prices[0], BatchPriceItem::Success { price, .. } if price == "3000.00000000"));
    assert!(matches!(&report.prices[1], BatchPriceItem::Error { .. }));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["prices"][0]["status"], "success");
    assert_eq!(json["prices"][1]["status"], "error");
    assert!(json["prices"][1]["feedAddress"].is_string());
}

#[tokio::test]
async fn test_derived_price_uses_integer_division() -> Result<()> {
    let reader = reader(
        InMemoryLedger::default()
            .with_feed(eth_usd(), 250_000_000_000, 8, "ETH / USD")
            .with_feed(eur_usd(), 135_000_000, 8, "EUR / USD"),
    );

    let report = reader.derived_price(eth_usd(), eur_usd()).await?;
    assert_eq!(report.derived_price, "1851.85185185");
    assert_eq!(report.raw_derived_price, "185185185185");
    assert_eq!(report.derived_pair, "ETH / EUR");
    assert_eq!(report.base_price, "2500.00000000");
    assert_eq!(report.quote_price, "1.35000000");

    Ok(())
}

#[tokio::test]
async fn test_derived_price_rejects_zero_quote() {
    let reader = reader(
        InMemoryLedger::default()
            .with_feed(eth_usd(), 250_000_000_000, 8, "ETH / USD")
            .with_feed(eur_usd(), 0, 8, "EUR / USD"),
    );

    let err = reader.derived_price(eth_usd(), eur_usd()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Core(sentinel_core::CoreError::DivisionByZero)));
}

#[tokio::test]
async fn test_sequencer_status_defaults_to_catalog_feed() -> Result<()> {
    let sequencer: Address = "0xFdB631F5EE196F0ed6FAa767959853A9F217697D".parse().unwrap();
    let ledger = InMemoryLedger::default().with_feed(sequencer, 0, 0, "L2 Sequencer Uptime Status Feed");
    let reader = FeedReader::new(Arc::new(ledger), Network::ArbitrumMainnet);

    let status = reader.sequencer_status(None, 1_700_000_600).await?;
    assert!(status.is_sequencer_up);
    assert_eq!(status.status, "UP");
    assert!(status.is_within_grace_period);
    assert_eq!(status.grace_period_remaining_seconds, 3_000);
    assert_eq!(status.state_duration_minutes, 10);
    assert_eq!(status.state_duration_hours, "0.16");

    let unsupported = FeedReader::new(Arc::new(InMemoryLedger::default()), Network::EthereumMainnet);
    assert!(unsupported.sequencer_status(None, 0).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_token_balance_defaults_to_link() -> Result<()> {
    let holder = Address::repeat_byte(0x42);
    let mut ledger = InMemoryLedger::default();
    ledger
        .balances
        .insert((link(), holder), BigInt::from(1_500_000_000_000_000_000u64));
    let reader = reader(ledger);

    let balance = reader.token_balance(None, holder).await?;
    assert_eq!(balance.balance, "1.500000000000000000");
    assert_eq!(balance.balance_raw, "1500000000000000000");
    assert_eq!(balance.token, "0x514910771AF9Ca656af840dff83E8264EcF986CA");

    Ok(())
}

#[tokio::test]
async fn test_registry_price_resolves_symbols() -> Result<()> {
    let registry: Address = "0x47Fb2585D2C56Fe188D0E6ec628a38b74fCeeeDf".parse().unwrap();
    let eth: Address = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".parse().unwrap();
    let usd = Address::from_low_u64_be(0x348);

    let mut ledger = InMemoryLedger::default().with_feed(eth_usd(), 312_345_000_000, 8, "ETH / USD");
    ledger.registry.insert((registry, eth, usd), eth_usd());
    let reader = reader(ledger);

    let report = reader.registry_price("ETH", "USD").await?;
    assert_eq!(report.price, "3123.45000000");
    assert_eq!(report.pair, "ETH / USD");
    assert_eq!(report.base_asset, "ETH");
    assert_eq!(report.quote_asset, "USD");
    assert_eq!(report.feed_address, sentinel_core::utils::checksum_address(&eth_usd()));

    let unknown = reader.registry_price("BTC", "USD").await;
    assert!(matches!(unknown, Err(LedgerError::FeedUnavailable { .. })));

    Ok(())
}

#[tokio::test]
async fn test_registry_price_is_mainnet_only() {
    let reader = FeedReader::new(Arc::new(InMemoryLedger::default()), Network::PolygonMainnet);
    let err = reader.registry_price("ETH", "USD").await.unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::ServiceUnavailable { .. })));
}

#[tokio::test]
async fn test_proof_of_reserve_preset() -> Result<()> {
    let wbtc: Address = "0xa81FE04086865e63E12dD3776978E49DEEa2ea4e".parse().unwrap();
    let reader = reader(InMemoryLedger::default().with_feed(wbtc, 15_432_100_000_000, 8, "WBTC PoR"));

    let report = reader.preset_data_feed(DataFeedKind::ProofOfReserve, "WBTC").await?;
    assert_eq!(report.name, "WBTC Reserve");
    assert_eq!(report.value, "154321.00000000");
    assert_eq!(report.raw_value, "15432100000000");
    assert_eq!(report.feed_type, "Proof of Reserve");

    let missing = reader.preset_data_feed(DataFeedKind::ProofOfReserve, "DAI").await;
    assert!(matches!(missing, Err(LedgerError::Core(CoreError::FeedNotFound { .. }))));

    Ok(())
}

#[tokio::test]
async fn test_nft_floor_price_custom_feed() -> Result<()> {
    let floor = Address::repeat_byte(0x77);
    let reader = reader(InMemoryLedger::default().with_feed(floor, 1_250_000_000_000_000_000, 18, "Custom / ETH"));

    let report = reader
        .data_feed(DataFeedKind::NftFloorPrice, floor, "Custom Collection")
        .await?;
    assert_eq!(report.value, "1.250000000000000000");
    assert_eq!(report.feed_type, "NFT Floor Price");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["feedType"], "NFT Floor Price");
    assert_eq!(json["rawValue"], "1250000000000000000");

    Ok(())
}

#[tokio::test]
async fn test_link_allowance_flags_unlimited() -> Result<()> {
    let owner = Address::repeat_byte(0x0a);
    let spender = Address::repeat_byte(0x0b);
    let other = Address::repeat_byte(0x0c);
    let mut ledger = InMemoryLedger::default();
    ledger
        .allowances
        .insert((link(), owner, spender), BigInt::from(2).pow(256u32) - 1);
    ledger
        .allowances
        .insert((link(), owner, other), BigInt::from(500_000_000_000_000_000u64));
    let reader = reader(ledger);

    let unlimited = reader.link_allowance(owner, spender).await?;
    assert!(unlimited.is_unlimited);
    assert!(unlimited.has_allowance);

    let limited = reader.link_allowance(owner, other).await?;
    assert!(!limited.is_unlimited);
    assert_eq!(limited.allowance, "0.500000000000000000");

    let none = reader.link_allowance(spender, owner).await?;
    assert!(!none.has_allowance);
    assert_eq!(none.allowance_raw, "0");

    Ok(())
}

#[tokio::test]
async fn test_link_total_supply() -> Result<()> {
    let mut ledger = InMemoryLedger::default();
    let supply = BigInt::from(1_000_000_000u64) * BigInt::from(10).pow(18u32);
    ledger.supplies.insert(link(), supply);
    let reader = reader(ledger);

    let report = reader.link_total_supply().await?;
    assert_eq!(report.total_supply, "1000000000.000000000000000000");
    assert_eq!(report.total_supply_raw, "1000000000000000000000000000");
    assert_eq!(report.decimals, 18);

    let custom = FeedReader::new(Arc::new(InMemoryLedger::default()), Network::Custom);
    assert!(matches!(
        custom.link_total_supply().await,
        Err(LedgerError::Core(CoreError::ServiceUnavailable { .. }))
    ));

    Ok(())
}
