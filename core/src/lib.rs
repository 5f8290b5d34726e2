//! # Sentinel Core
//!
//! Fixed-point decimal engine, oracle round model and the static network
//! catalog shared by the ledger facade and the trigger engine.

pub mod catalog;
pub mod decimal;
pub mod error;
pub mod round;
pub mod sequencer;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use decimal::{EthUnit, ScaledDecimal, UnitConversion};
pub use error::{CoreError, Result};
pub use round::{RoundData, RoundId, RoundSnapshot, DEFAULT_STALENESS_THRESHOLD_SECS};
pub use sequencer::{SequencerHealth, SEQUENCER_GRACE_PERIOD_SECS};
pub use types::{FulfillmentKind, LogEntry, LogFilter};

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported oracle networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    EthereumMainnet,
    EthereumSepolia,
    PolygonMainnet,
    PolygonAmoy,
    ArbitrumMainnet,
    ArbitrumSepolia,
    OptimismMainnet,
    OptimismSepolia,
    AvalancheMainnet,
    AvalancheFuji,
    BnbMainnet,
    BnbTestnet,
    BaseMainnet,
    BaseSepolia,
    /// User-supplied RPC endpoint and chain id
    Custom,
}

impl Network {
    /// Every network in catalog order
    pub fn all() -> &'static [Network] {
        &[
            Network::EthereumMainnet,
            Network::EthereumSepolia,
            Network::PolygonMainnet,
            Network::PolygonAmoy,
            Network::ArbitrumMainnet,
            Network::ArbitrumSepolia,
            Network::OptimismMainnet,
            Network::OptimismSepolia,
            Network::AvalancheMainnet,
            Network::AvalancheFuji,
            Network::BnbMainnet,
            Network::BnbTestnet,
            Network::BaseMainnet,
            Network::BaseSepolia,
            Network::Custom,
        ]
    }

    /// Catalog key, e.g. `ethereum-mainnet`
    pub fn key(&self) -> &'static str {
        match self {
            Network::EthereumMainnet => "ethereum-mainnet",
            Network::EthereumSepolia => "ethereum-sepolia",
            Network::PolygonMainnet => "polygon-mainnet",
            Network::PolygonAmoy => "polygon-amoy",
            Network::ArbitrumMainnet => "arbitrum-mainnet",
            Network::ArbitrumSepolia => "arbitrum-sepolia",
            Network::OptimismMainnet => "optimism-mainnet",
            Network::OptimismSepolia => "optimism-sepolia",
            Network::AvalancheMainnet => "avalanche-mainnet",
            Network::AvalancheFuji => "avalanche-fuji",
            Network::BnbMainnet => "bnb-mainnet",
            Network::BnbTestnet => "bnb-testnet",
            Network::BaseMainnet => "base-mainnet",
            Network::BaseSepolia => "base-sepolia",
            Network::Custom => "custom",
        }
    }

    /// Get the chain ID for this network (0 for custom networks)
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::EthereumMainnet => 1,
            Network::EthereumSepolia => 11155111,
            Network::PolygonMainnet => 137,
            Network::PolygonAmoy => 80002,
            Network::ArbitrumMainnet => 42161,
            Network::ArbitrumSepolia => 421614,
            Network::OptimismMainnet => 10,
            Network::OptimismSepolia => 11155420,
            Network::AvalancheMainnet => 43114,
            Network::AvalancheFuji => 43113,
            Network::BnbMainnet => 56,
            Network::BnbTestnet => 97,
            Network::BaseMainnet => 8453,
            Network::BaseSepolia => 84532,
            Network::Custom => 0,
        }
    }

    /// Check if this is a test network
    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            Network::EthereumSepolia
                | Network::PolygonAmoy
                | Network::ArbitrumSepolia
                | Network::OptimismSepolia
                | Network::AvalancheFuji
                | Network::BnbTestnet
                | Network::BaseSepolia
        )
    }

    /// Check if this network runs behind an L2 sequencer
    pub fn is_l2(&self) -> bool {
        matches!(
            self,
            Network::ArbitrumMainnet
                | Network::ArbitrumSepolia
                | Network::OptimismMainnet
                | Network::OptimismSepolia
                | Network::BaseMainnet
                | Network::BaseSepolia
        )
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        if let Some(network) = Network::all().iter().find(|n| n.key() == key) {
            return Ok(*network);
        }
        match key.as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Network::EthereumMainnet),
            "sepolia" => Ok(Network::EthereumSepolia),
            "polygon" | "matic" => Ok(Network::PolygonMainnet),
            "arbitrum" | "arb" => Ok(Network::ArbitrumMainnet),
            "optimism" | "op" => Ok(Network::OptimismMainnet),
            "avalanche" | "avax" => Ok(Network::AvalancheMainnet),
            "bnb" | "bsc" => Ok(Network::BnbMainnet),
            "base" => Ok(Network::BaseMainnet),
            _ => Err(CoreError::InvalidNetwork(s.to_string())),
        }
    }
}
