//! Configuration management for the sentinel
//!
//! Layered as defaults, then an optional file, then `SENTINEL__*`
//! environment variables.

use std::collections::HashSet;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use sentinel_core::catalog;
use sentinel_core::{Network, ScaledDecimal};

use crate::error::{Result, TriggerError};
use crate::store::DEFAULT_KEY_PREFIX;
use crate::subscription::{parse_upkeep_id, FeedSource, Subscription, ThresholdMode, TriggerSpec, DEFAULT_LOOKBACK_BLOCKS};

/// Default config file looked up when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config/sentinel";

/// Top-level sentinel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelConfig {
    pub network: NetworkSettings,
    pub polling: PollingConfig,
    pub state: StateConfig,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// Which chain to watch and how to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub name: Network,
    /// Overrides the catalog RPC endpoint; required for custom networks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Chain id of a custom network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between two polls of the same subscription
    pub interval_secs: u64,
}

/// Cursor persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    pub backend: StateBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            network: NetworkSettings {
                name: Network::EthereumMainnet,
                rpc_url: None,
                chain_id: None,
                request_timeout_secs: 30,
            },
            polling: PollingConfig { interval_secs: 60 },
            state: StateConfig {
                backend: StateBackend::Memory,
                redis_url: None,
                key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            },
            subscriptions: vec![
                Subscription::new(
                    "eth-usd-moves",
                    TriggerSpec::PriceUpdate {
                        feed: FeedSource::Preset {
                            pair: "ETH/USD".to_string(),
                        },
                        change_threshold: ScaledDecimal::new(1, 0),
                    },
                ),
                Subscription::new(
                    "btc-usd-100k",
                    TriggerSpec::PriceThreshold {
                        feed: FeedSource::Preset {
                            pair: "BTC/USD".to_string(),
                        },
                        threshold_type: ThresholdMode::Cross,
                        threshold_price: ScaledDecimal::new(100_000, 0),
                    },
                ),
                Subscription::new(
                    "link-usd-rounds",
                    TriggerSpec::NewRound {
                        feed: FeedSource::Preset {
                            pair: "LINK/USD".to_string(),
                        },
                    },
                ),
                Subscription::new(
                    "vrf-fulfillments",
                    TriggerSpec::VrfFulfilled {
                        coordinator: None,
                        lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
                    },
                ),
            ],
        }
    }
}

impl SentinelConfig {
    /// Load layered configuration; `path` replaces the default file location
    pub fn load(path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("network.name", Network::EthereumMainnet.key())?
            .set_default("network.request_timeout_secs", 30)?
            .set_default("polling.interval_secs", 60)?
            .set_default("state.backend", "memory")?
            .set_default("state.key_prefix", DEFAULT_KEY_PREFIX)?
            .add_source(file)
            // Add environment variables with SENTINEL__ prefix
            .add_source(Environment::with_prefix("SENTINEL").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Message("polling.interval_secs must be greater than 0".into()));
        }

        if self.network.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "network.request_timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(rpc_url) = &self.network.rpc_url {
            if Url::parse(rpc_url).is_err() {
                return Err(ConfigError::Message(format!("Invalid RPC URL: {}", rpc_url)));
            }
        }

        if self.network.name == Network::Custom {
            if self.network.rpc_url.is_none() {
                return Err(ConfigError::Message("Custom network requires network.rpc_url".into()));
            }
            if self.network.chain_id.is_none() {
                return Err(ConfigError::Message("Custom network requires network.chain_id".into()));
            }
        }

        if self.state.backend == StateBackend::Redis {
            match &self.state.redis_url {
                Some(url) if Url::parse(url).is_ok() => {}
                Some(url) => return Err(ConfigError::Message(format!("Invalid Redis URL: {}", url))),
                None => return Err(ConfigError::Message("Redis backend requires state.redis_url".into())),
            }
        }

        let mut ids = HashSet::new();
        for subscription in &self.subscriptions {
            if subscription.id.trim().is_empty() {
                return Err(ConfigError::Message("Subscription id cannot be empty".into()));
            }
            if !ids.insert(subscription.id.as_str()) {
                return Err(ConfigError::Message(format!("Duplicate subscription id: {}", subscription.id)));
            }
            validate_trigger(&subscription.id, &subscription.trigger)?;
        }

        Ok(())
    }

    /// RPC endpoint to use: explicit override, else the catalog default
    pub fn rpc_url(&self) -> Result<String> {
        if let Some(url) = &self.network.rpc_url {
            return Ok(url.clone());
        }

        catalog::network_info(self.network.name)
            .map(|info| info.rpc_url)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TriggerError::invalid_config(format!("No RPC URL known for {}", self.network.name)))
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TriggerError::Config(ConfigError::Foreign(Box::new(e))))?;

        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| TriggerError::Config(ConfigError::Foreign(Box::new(e))))?;

        Ok(config)
    }

    /// Save configuration to YAML file (for generating examples)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| TriggerError::invalid_config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, yaml)?;

        Ok(())
    }
}

fn validate_trigger(id: &str, trigger: &TriggerSpec) -> std::result::Result<(), ConfigError> {
    match trigger {
        TriggerSpec::PriceUpdate { change_threshold, .. } if change_threshold.is_negative() => Err(
            ConfigError::Message(format!("Subscription {}: change_threshold cannot be negative", id)),
        ),
        TriggerSpec::VrfFulfilled { lookback_blocks, .. } | TriggerSpec::UpkeepPerformed { lookback_blocks, .. }
            if *lookback_blocks == 0 =>
        {
            Err(ConfigError::Message(format!(
                "Subscription {}: lookback_blocks must be greater than 0",
                id
            )))
        }
        TriggerSpec::UpkeepPerformed { upkeep_id, .. } => parse_upkeep_id(upkeep_id)
            .map(|_| ())
            .map_err(|e| ConfigError::Message(format!("Subscription {}: {}", id, e))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SentinelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subscriptions.len(), 4);
        assert_eq!(config.rpc_url().unwrap(), "https://eth.llamarpc.com");

        for subscription in &config.subscriptions {
            assert!(subscription.resolve(config.network.name).is_ok(), "{}", subscription.id);
        }
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let mut config = SentinelConfig::default();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SentinelConfig::default();
        config.state.backend = StateBackend::Redis;
        assert!(config.validate().is_err());
        config.state.redis_url = Some("redis://127.0.0.1:6379".to_string());
        assert!(config.validate().is_ok());

        let mut config = SentinelConfig::default();
        config.network.name = Network::Custom;
        config.network.rpc_url = Some("http://localhost:8545".to_string());
        assert!(config.validate().is_err());
        config.network.chain_id = Some(31337);
        assert!(config.validate().is_ok());

        let mut config = SentinelConfig::default();
        let duplicate = config.subscriptions[0].clone();
        config.subscriptions.push(duplicate);
        assert!(config.validate().is_err());

        let mut config = SentinelConfig::default();
        config.subscriptions = vec![Subscription::new(
            "upkeep",
            TriggerSpec::UpkeepPerformed {
                upkeep_id: "not-a-number".to_string(),
                registry: None,
                lookback_blocks: 10,
            },
        )];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_config() {
        let config = SentinelConfig::default();
        let temp_path = std::env::temp_dir().join("sentinel_config_roundtrip.yaml");

        config.save_to_file(&temp_path).unwrap();
        let loaded = SentinelConfig::from_file(&temp_path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&temp_path).ok();
    }

    #[test]
    fn test_layered_load_reads_yaml_file() {
        let temp_path = std::env::temp_dir().join("sentinel_layered_load.yaml");
        std::fs::write(
            &temp_path,
            r#"
network:
  name: arbitrum-mainnet
polling:
  interval_secs: 15
subscriptions:
  - id: arb-sequencer
    trigger:
      event: sequencer_change
"#,
        )
        .unwrap();

        let config = SentinelConfig::load(temp_path.to_str()).unwrap();
        assert_eq!(config.network.name, Network::ArbitrumMainnet);
        assert_eq!(config.network.request_timeout_secs, 30);
        assert_eq!(config.polling.interval_secs, 15);
        assert_eq!(config.state.backend, StateBackend::Memory);
        assert_eq!(config.subscriptions.len(), 1);
        assert_eq!(config.subscriptions[0].trigger, TriggerSpec::SequencerChange { feed_address: None });

        std::fs::remove_file(&temp_path).ok();
    }
}
