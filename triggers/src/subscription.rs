//! Trigger subscriptions and their resolution against the network catalog

use std::fmt;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use sentinel_core::catalog::{self, NetworkInfo};
use sentinel_core::{CoreError, FulfillmentKind, LogFilter, Network, ScaledDecimal};

use crate::error::{Result, TriggerError};

/// Default number of blocks a log scanner looks back on its first poll
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 1000;

/// Where a price trigger reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FeedSource {
    /// Catalog feed, e.g. `ETH/USD`
    Preset { pair: String },
    /// Any aggregator contract
    Custom { address: Address },
}

impl FeedSource {
    /// Feed contract on `network`
    pub fn resolve(&self, network: Network) -> Result<Address> {
        match self {
            FeedSource::Preset { pair } => Ok(catalog::price_feed(network, pair)?.address()?),
            FeedSource::Custom { address } => Ok(*address),
        }
    }
}

/// Threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Above,
    Below,
    /// Either direction, compared against the previous poll
    Cross,
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdMode::Above => write!(f, "above"),
            ThresholdMode::Below => write!(f, "below"),
            ThresholdMode::Cross => write!(f, "cross"),
        }
    }
}

/// Per-event trigger parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// Price moved by at least `change_threshold` percent since the last round seen
    PriceUpdate {
        feed: FeedSource,
        #[serde(default = "default_change_threshold")]
        change_threshold: ScaledDecimal,
    },
    PriceThreshold {
        feed: FeedSource,
        threshold_type: ThresholdMode,
        threshold_price: ScaledDecimal,
    },
    NewRound {
        feed: FeedSource,
    },
    VrfFulfilled {
        /// Defaults to the network's VRF coordinator
        #[serde(default, skip_serializing_if = "Option::is_none")]
        coordinator: Option<Address>,
        #[serde(default = "default_lookback_blocks")]
        lookback_blocks: u64,
    },
    UpkeepPerformed {
        /// Decimal or 0x-prefixed hex upkeep id
        upkeep_id: String,
        /// Defaults to the network's automation registry
        #[serde(default, skip_serializing_if = "Option::is_none")]
        registry: Option<Address>,
        #[serde(default = "default_lookback_blocks")]
        lookback_blocks: u64,
    },
    SequencerChange {
        /// Defaults to the network's uptime feed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feed_address: Option<Address>,
    },
}

fn default_change_threshold() -> ScaledDecimal {
    ScaledDecimal::new(1, 0)
}

fn default_lookback_blocks() -> u64 {
    DEFAULT_LOOKBACK_BLOCKS
}

impl TriggerSpec {
    /// Event tag of the payloads this trigger produces
    pub fn event_name(&self) -> &'static str {
        match self {
            TriggerSpec::PriceUpdate { .. } => "priceUpdate",
            TriggerSpec::PriceThreshold { .. } => "priceThreshold",
            TriggerSpec::NewRound { .. } => "newRound",
            TriggerSpec::VrfFulfilled { .. } => "vrfFulfilled",
            TriggerSpec::UpkeepPerformed { .. } => "upkeepPerformed",
            TriggerSpec::SequencerChange { .. } => "sequencerChange",
        }
    }

    /// Resolve catalog lookups and parse identifiers for `network`
    pub fn resolve(&self, network: Network) -> Result<ResolvedTrigger> {
        let resolved = match self {
            TriggerSpec::PriceUpdate { feed, change_threshold } => ResolvedTrigger::PriceUpdate {
                feed: feed.resolve(network)?,
                change_threshold: change_threshold.clone(),
            },
            TriggerSpec::PriceThreshold {
                feed,
                threshold_type,
                threshold_price,
            } => ResolvedTrigger::PriceThreshold {
                feed: feed.resolve(network)?,
                mode: *threshold_type,
                threshold: threshold_price.clone(),
            },
            TriggerSpec::NewRound { feed } => ResolvedTrigger::NewRound {
                feed: feed.resolve(network)?,
            },
            TriggerSpec::VrfFulfilled {
                coordinator,
                lookback_blocks,
            } => {
                let coordinator = match coordinator {
                    Some(address) => *address,
                    None => info(network, "VRF")?.vrf_coordinator_address()?,
                };
                ResolvedTrigger::LogScan {
                    filter: LogFilter::new(coordinator, FulfillmentKind::RandomWordsFulfilled),
                    lookback_blocks: *lookback_blocks,
                }
            }
            TriggerSpec::UpkeepPerformed {
                upkeep_id,
                registry,
                lookback_blocks,
            } => {
                let registry = match registry {
                    Some(address) => *address,
                    None => info(network, "Automation")?.automation_registry_address()?,
                };
                ResolvedTrigger::LogScan {
                    filter: LogFilter::new(registry, FulfillmentKind::UpkeepPerformed)
                        .with_indexed_id(parse_upkeep_id(upkeep_id)?),
                    lookback_blocks: *lookback_blocks,
                }
            }
            TriggerSpec::SequencerChange { feed_address } => ResolvedTrigger::SequencerChange {
                feed: match feed_address {
                    Some(address) => *address,
                    None => catalog::sequencer_feed(network)?.address()?,
                },
            },
        };

        Ok(resolved)
    }
}

/// Catalog entry of `network`; a missing entry means no catalog service is available
fn info(network: Network, service: &str) -> Result<&'static NetworkInfo> {
    catalog::network_info(network).ok_or_else(|| CoreError::service_unavailable(service, network.key()).into())
}

/// Parse a decimal or `0x` hex upkeep id
pub fn parse_upkeep_id(raw: &str) -> Result<U256> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(trimmed).ok(),
    };
    parsed.ok_or_else(|| TriggerError::invalid_config(format!("Invalid upkeep id: {:?}", raw)))
}

/// Trigger with every address and identifier settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTrigger {
    PriceUpdate {
        feed: Address,
        change_threshold: ScaledDecimal,
    },
    PriceThreshold {
        feed: Address,
        mode: ThresholdMode,
        threshold: ScaledDecimal,
    },
    NewRound {
        feed: Address,
    },
    /// VRF fulfillments or automation performs
    LogScan {
        filter: LogFilter,
        lookback_blocks: u64,
    },
    SequencerChange {
        feed: Address,
    },
}

impl ResolvedTrigger {
    pub fn event_name(&self) -> &'static str {
        match self {
            ResolvedTrigger::PriceUpdate { .. } => "priceUpdate",
            ResolvedTrigger::PriceThreshold { .. } => "priceThreshold",
            ResolvedTrigger::NewRound { .. } => "newRound",
            ResolvedTrigger::LogScan { filter, .. } => match filter.kind {
                FulfillmentKind::RandomWordsFulfilled => "vrfFulfilled",
                FulfillmentKind::UpkeepPerformed => "upkeepPerformed",
            },
            ResolvedTrigger::SequencerChange { .. } => "sequencerChange",
        }
    }
}

/// A named trigger as configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub trigger: TriggerSpec,
}

impl Subscription {
    pub fn new<S: Into<String>>(id: S, trigger: TriggerSpec) -> Self {
        Self { id: id.into(), trigger }
    }

    pub fn resolve(&self, network: Network) -> Result<ResolvedSubscription> {
        Ok(ResolvedSubscription {
            id: self.id.clone(),
            trigger: self.trigger.resolve(network)?,
        })
    }
}

/// A subscription ready to be polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubscription {
    pub id: String,
    pub trigger: ResolvedTrigger,
}

impl ResolvedSubscription {
    /// State store key, disjoint per network, subscription and event kind
    pub fn cursor_key(&self, network: Network) -> String {
        format!("{}:{}:{}", network.key(), self.id, self.trigger.event_name())
    }
}
