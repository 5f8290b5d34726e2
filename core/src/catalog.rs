//! Static network, contract and data feed catalog
//!
//! Tables are keyed by network and built once on first access. Addresses are
//! kept as literals and parsed on lookup so a malformed entry surfaces as an
//! `InvalidAddress` error instead of a panic.

use std::collections::HashMap;
use std::fmt;

use ethers::types::Address;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::utils::parse_address;
use crate::Network;

/// Key of the L2 sequencer uptime entry inside a network's feed table
pub const SEQUENCER_UPTIME_KEY: &str = "SEQUENCER_UPTIME";

/// Static configuration of one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub network: Network,
    pub name: &'static str,
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub link_token: Option<&'static str>,
    pub vrf_coordinator: Option<&'static str>,
    pub automation_registry: Option<&'static str>,
    pub feed_registry: Option<&'static str>,
    pub is_testnet: bool,
}

impl NetworkInfo {
    /// LINK token contract
    pub fn link_token_address(&self) -> Result<Address> {
        self.service_address("LINK token", self.link_token)
    }

    /// VRF coordinator contract
    pub fn vrf_coordinator_address(&self) -> Result<Address> {
        self.service_address("VRF", self.vrf_coordinator)
    }

    /// Automation registry contract
    pub fn automation_registry_address(&self) -> Result<Address> {
        self.service_address("Automation", self.automation_registry)
    }

    /// Feed registry contract (Ethereum mainnet only)
    pub fn feed_registry_address(&self) -> Result<Address> {
        self.service_address("Feed Registry", self.feed_registry)
    }

    fn service_address(&self, service: &str, address: Option<&'static str>) -> Result<Address> {
        match address {
            Some(address) => parse_address(address),
            None => Err(CoreError::service_unavailable(service, self.network.key())),
        }
    }
}

/// Asset class of a price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedCategory {
    Crypto,
    Forex,
    Commodity,
    Equity,
    Other,
}

impl fmt::Display for FeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedCategory::Crypto => "crypto",
            FeedCategory::Forex => "forex",
            FeedCategory::Commodity => "commodity",
            FeedCategory::Equity => "equity",
            FeedCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Preset price feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeedInfo {
    /// Lookup key, e.g. `ETH/USD`
    pub key: &'static str,
    pub address: &'static str,
    /// On-chain description, e.g. `ETH / USD`
    pub pair: &'static str,
    pub decimals: u32,
    pub category: FeedCategory,
}

impl PriceFeedInfo {
    pub fn address(&self) -> Result<Address> {
        parse_address(self.address)
    }
}

/// L2 sequencer uptime feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerFeedInfo {
    /// Network key; not every sequencer network has a full catalog entry
    pub network: &'static str,
    pub address: &'static str,
}

impl SequencerFeedInfo {
    pub fn address(&self) -> Result<Address> {
        parse_address(self.address)
    }
}

/// Kind of non-price data feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFeedKind {
    ProofOfReserve,
    NftFloorPrice,
}

impl DataFeedKind {
    /// Human readable feed type
    pub fn label(&self) -> &'static str {
        match self {
            DataFeedKind::ProofOfReserve => "Proof of Reserve",
            DataFeedKind::NftFloorPrice => "NFT Floor Price",
        }
    }
}

/// Proof of Reserve or NFT floor price feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFeedInfo {
    /// Lookup key, e.g. `WBTC` or `BAYC`
    pub key: &'static str,
    pub address: &'static str,
    /// Reserve asset or collection name
    pub name: &'static str,
    pub decimals: u32,
}

impl DataFeedInfo {
    pub fn address(&self) -> Result<Address> {
        parse_address(self.address)
    }
}

const fn feed(
    key: &'static str,
    address: &'static str,
    pair: &'static str,
    decimals: u32,
    category: FeedCategory,
) -> PriceFeedInfo {
    PriceFeedInfo {
        key,
        address,
        pair,
        decimals,
        category,
    }
}

use FeedCategory::{Commodity, Crypto, Forex, Other};

static NETWORKS: Lazy<HashMap<Network, NetworkInfo>> = Lazy::new(|| {
    let entries = vec![
        NetworkInfo {
            network: Network::EthereumMainnet,
            name: "Ethereum Mainnet",
            chain_id: 1,
            rpc_url: "https://eth.llamarpc.com",
            explorer_url: "https://etherscan.io",
            link_token: Some("0x514910771AF9Ca656af840dff83E8264EcF986CA"),
            vrf_coordinator: Some("0x271682DEB8C4E0901D1a1550aD2e64D568E69909"),
            automation_registry: Some("0x6593c7De001fC8542bB1703532EE1E5aA0D458fD"),
            feed_registry: Some("0x47Fb2585D2C56Fe188D0E6ec628a38b74fCeeeDf"),
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::EthereumSepolia,
            name: "Ethereum Sepolia",
            chain_id: 11155111,
            rpc_url: "https://rpc.sepolia.org",
            explorer_url: "https://sepolia.etherscan.io",
            link_token: Some("0x779877A7B0D9E8603169DdbD7836e478b4624789"),
            vrf_coordinator: Some("0x8103B0A8A00be2DDC778e6e7eaa21791Cd364625"),
            automation_registry: Some("0x86EFBD0b6736Bed994962f9797049422A3A8E8Ad"),
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::PolygonMainnet,
            name: "Polygon Mainnet",
            chain_id: 137,
            rpc_url: "https://polygon-rpc.com",
            explorer_url: "https://polygonscan.com",
            link_token: Some("0xb0897686c545045aFc77CF20eC7A532E3120E0F1"),
            vrf_coordinator: Some("0xAE975071Be8F8eE67addBC1A82488F1C24858067"),
            automation_registry: Some("0x08a8eea76D2395807Ce7D1FC942382515469cCA1"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::PolygonAmoy,
            name: "Polygon Amoy",
            chain_id: 80002,
            rpc_url: "https://rpc-amoy.polygon.technology",
            explorer_url: "https://amoy.polygonscan.com",
            link_token: Some("0x0Fd9e8d3aF1aaee056EB9e802c3A762a667b1904"),
            vrf_coordinator: Some("0x343300b5d84D444B2ADc9116FEF1bED02BE49Cf2"),
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::ArbitrumMainnet,
            name: "Arbitrum One",
            chain_id: 42161,
            rpc_url: "https://arb1.arbitrum.io/rpc",
            explorer_url: "https://arbiscan.io",
            link_token: Some("0xf97f4df75117a78c1A5a0DBb814Af92458539FB4"),
            vrf_coordinator: Some("0x41034678D6C633D8a95c75e1138A360a28bA15d1"),
            automation_registry: Some("0x75c0530885F385721fddA23C539AF3701d6183D4"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::ArbitrumSepolia,
            name: "Arbitrum Sepolia",
            chain_id: 421614,
            rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
            explorer_url: "https://sepolia.arbiscan.io",
            link_token: Some("0xb1D4538B4571d411F07960EF2838Ce337FE1E80E"),
            vrf_coordinator: Some("0x50d47e4142598E3411aA864e08a44284e471AC6f"),
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::OptimismMainnet,
            name: "Optimism Mainnet",
            chain_id: 10,
            rpc_url: "https://mainnet.optimism.io",
            explorer_url: "https://optimistic.etherscan.io",
            link_token: Some("0x350a791Bfc2C21F9Ed5d10980Dad2e2638ffa7f6"),
            vrf_coordinator: None,
            automation_registry: Some("0x75c0530885F385721fddA23C539AF3701d6183D4"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::OptimismSepolia,
            name: "Optimism Sepolia",
            chain_id: 11155420,
            rpc_url: "https://sepolia.optimism.io",
            explorer_url: "https://sepolia-optimism.etherscan.io",
            link_token: Some("0xE4aB69C077896252FAFBD49EFD26B5D171A32410"),
            vrf_coordinator: None,
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::AvalancheMainnet,
            name: "Avalanche C-Chain",
            chain_id: 43114,
            rpc_url: "https://api.avax.network/ext/bc/C/rpc",
            explorer_url: "https://snowtrace.io",
            link_token: Some("0x5947BB275c521040051D82396192181b413227A3"),
            vrf_coordinator: Some("0xd5D517aBE5cF79B7e95eC98dB0f0277788aFF634"),
            automation_registry: Some("0x7f00a3Cd4590009C349192510D51F8e6312E08CB"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::AvalancheFuji,
            name: "Avalanche Fuji",
            chain_id: 43113,
            rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
            explorer_url: "https://testnet.snowtrace.io",
            link_token: Some("0x0b9d5D9136855f6FEc3c0993feE6E9CE8a297846"),
            vrf_coordinator: Some("0x2eD832Ba664535e5886b75D64C46EB9a228C2610"),
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::BnbMainnet,
            name: "BNB Chain Mainnet",
            chain_id: 56,
            rpc_url: "https://bsc-dataseed.binance.org",
            explorer_url: "https://bscscan.com",
            link_token: Some("0x404460C6A5EdE2D891e8297795264fDe62ADBB75"),
            vrf_coordinator: Some("0xc587d9053cd1118f25F645F9E08BB98c9712A4EE"),
            automation_registry: Some("0x7B3EC232b08BD7b4b3305BE0C044D907B2DF960B"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::BnbTestnet,
            name: "BNB Chain Testnet",
            chain_id: 97,
            rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
            explorer_url: "https://testnet.bscscan.com",
            link_token: Some("0x84b9B910527Ad5C03A9Ca831909E21e236EA7b06"),
            vrf_coordinator: Some("0x6A2AAd07396B36Fe02a22b33cf443582f682c82f"),
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::BaseMainnet,
            name: "Base Mainnet",
            chain_id: 8453,
            rpc_url: "https://mainnet.base.org",
            explorer_url: "https://basescan.org",
            link_token: Some("0x88Fb150BDc53A65fe94Dea0c9BA0a6dAf8C6e196"),
            vrf_coordinator: None,
            automation_registry: Some("0xE226D5aCae908252CcA3F6CEFa577527650a9e1e"),
            feed_registry: None,
            is_testnet: false,
        },
        NetworkInfo {
            network: Network::BaseSepolia,
            name: "Base Sepolia",
            chain_id: 84532,
            rpc_url: "https://sepolia.base.org",
            explorer_url: "https://sepolia.basescan.org",
            link_token: Some("0xE4aB69C077896252FAFBD49EFD26B5D171A32410"),
            vrf_coordinator: Some("0xD21ae5C71C5D1E9F1E5Edc6e9D8CfF4B8B8E5Bb1"),
            automation_registry: None,
            feed_registry: None,
            is_testnet: true,
        },
        NetworkInfo {
            network: Network::Custom,
            name: "Custom Network",
            chain_id: 0,
            rpc_url: "",
            explorer_url: "",
            link_token: None,
            vrf_coordinator: None,
            automation_registry: None,
            feed_registry: None,
            is_testnet: false,
        },
    ];

    entries.into_iter().map(|info| (info.network, info)).collect()
});

static PRICE_FEEDS: Lazy<HashMap<Network, Vec<PriceFeedInfo>>> = Lazy::new(|| {
    let mut feeds = HashMap::new();

    feeds.insert(
        Network::EthereumMainnet,
        vec![
            feed("ETH/USD", "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0xF4030086522a5bEEa4988F8cA5B36dbC97BeE88c", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x2c1d072e956AFFC0D435Cb7AC38EF18d24d9127c", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0x8fFfFfd4AfB6115b954Bd326cbe7B4BA576818f6", "USDC / USD", 8, Crypto),
            feed("USDT/USD", "0x3E7d1eAB13ad0104d2750B8863b489D65364e32D", "USDT / USD", 8, Crypto),
            feed("DAI/USD", "0xAed0c38402a5d19df6E4c03F4E2DceD6e29c1ee9", "DAI / USD", 8, Crypto),
            feed("AAVE/USD", "0x547a514d5e3769680Ce22B2361c10Ea13619e8a9", "AAVE / USD", 8, Crypto),
            feed("UNI/USD", "0x553303d460EE0afB37EdFf9bE42922D8FF63220e", "UNI / USD", 8, Crypto),
            feed("MATIC/USD", "0x7bAC85A8a13A4BcD8abb3eB7d6b4d632c5a57676", "MATIC / USD", 8, Crypto),
            feed("SOL/USD", "0x4ffC43a60e009B551865A93d232E33Fce9f01507", "SOL / USD", 8, Crypto),
            feed("AVAX/USD", "0xFF3EEb22B22c8F9c7ACf2a7d5d81b67E3a07f7CA", "AVAX / USD", 8, Crypto),
            feed("EUR/USD", "0xb49f677943BC038e9857d61E7d053CaA2C1734C1", "EUR / USD", 8, Forex),
            feed("GBP/USD", "0x5c0Ab2d9b5a7ed9f470386e82BB36A3613cDd4b5", "GBP / USD", 8, Forex),
            feed("JPY/USD", "0xBcE206caE7f0ec07b545EddE332A47C2F75bbeb3", "JPY / USD", 8, Forex),
            feed("XAU/USD", "0x214eD9Da11D2fbe465a6fc601a91E62EbEc1a0D6", "XAU / USD", 8, Commodity),
            feed("XAG/USD", "0x379589227b15F1a12195D3f2d90bBc9F31f95235", "XAG / USD", 8, Commodity),
            feed("FAST_GAS", "0x169E633A2D1E6c10dD91238Ba11c4A708dfEF37C", "Fast Gas / Gwei", 0, Other),
        ],
    );

    feeds.insert(
        Network::EthereumSepolia,
        vec![
            feed("ETH/USD", "0x694AA1769357215DE4FAC081bf1f309aDC325306", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x1b44F3514812d835EB1BDB0acB33d3fA3351Ee43", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xc59E3633BAAC79493d908e63626716e204A45EdF", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0xA2F78ab2355fe2f984D808B5CeE7FD0A93D5270E", "USDC / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::PolygonMainnet,
        vec![
            feed("MATIC/USD", "0xAB594600376Ec9fD91F8e885dADF0CE036862dE0", "MATIC / USD", 8, Crypto),
            feed("ETH/USD", "0xF9680D99D6C9589e2a93a78A04A279e509205945", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0xc907E116054Ad103354f2D350FD2514433D57F6f", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xd9FFdb71EbE7496cC440152d43986Aae0AB76665", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0xfE4A8cc5b5B2366C1B58Bea3858e81843581b2F7", "USDC / USD", 8, Crypto),
            feed("USDT/USD", "0x0A6513e40db6EB1b165753AD52E80663aeA50545", "USDT / USD", 8, Crypto),
            feed("AAVE/USD", "0x72484B12719E23115761D5DA1646945632979bB6", "AAVE / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::PolygonAmoy,
        vec![
            feed("MATIC/USD", "0x001382149eBa3441043c1c66972b4772963f5D43", "MATIC / USD", 8, Crypto),
            feed("ETH/USD", "0xF0d50568e3A7e8259E16663972b11910F89BD8e7", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0xe7656e23fE8077D438aEfbec2fAbDf2D8e070C4f", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xc2e2848e28B9fE430Ab44F55a8437a33802a219C", "LINK / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::ArbitrumMainnet,
        vec![
            feed("ETH/USD", "0x639Fe6ab55C921f74e7fac1ee960C0B6293ba612", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x6ce185860a4963106506C203335A583Af92a5538", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x86E53CF1B870786351Da77A57575e79CB55812CB", "LINK / USD", 8, Crypto),
            feed("ARB/USD", "0xb2A824043730FE05F3DA2efaFa1CBbe83fa548D6", "ARB / USD", 8, Crypto),
            feed("USDC/USD", "0x50834F3163758fcC1Df9973b6e91f0F0F0434aD3", "USDC / USD", 8, Crypto),
            feed("USDT/USD", "0x3f3f5dF88dC9F13eac63DF89EC16ef6e7E25DdE7", "USDT / USD", 8, Crypto),
            feed(SEQUENCER_UPTIME_KEY, "0xFdB631F5EE196F0ed6FAa767959853A9F217697D", "Sequencer Uptime", 0, Other),
        ],
    );

    feeds.insert(
        Network::ArbitrumSepolia,
        vec![
            feed("ETH/USD", "0xd30e2101a97dcbAeBCBC04F14C3f624E67A35165", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x56a43EB56Da12C0dc1D972ACb089c06a5dEF8e69", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x0FB99723Aee6f420beAD13e6bBB79b7E6F034298", "LINK / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::OptimismMainnet,
        vec![
            feed("ETH/USD", "0x13e3Ee699D1909E989722E753853AE30b17e08c5", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0xD702DD976Fb76Fffc2D3963D037dfDae5b04E593", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xCc232dcFAAE6354cE191Bd574108c1aD03f86ceE", "LINK / USD", 8, Crypto),
            feed("OP/USD", "0x0D276FC14719f9292D5C1eA2198673d1f4269246", "OP / USD", 8, Crypto),
            feed("USDC/USD", "0x16a9FA2FDa030272Ce99B29CF780dFA30361E0f3", "USDC / USD", 8, Crypto),
            feed(SEQUENCER_UPTIME_KEY, "0x371EAD81c9102C9BF4874A9075FFFf170F2Ee389", "Sequencer Uptime", 0, Other),
        ],
    );

    feeds.insert(
        Network::OptimismSepolia,
        vec![
            feed("ETH/USD", "0x61Ec26aA57019C486B10502285c5A3D4A4750AD7", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x3015aa11f5c2D4Bd0f891E708C8927961b38cE7D", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x5f0423B1a6935dc5596e7A24d98532b67A0AeFd8", "LINK / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::AvalancheMainnet,
        vec![
            feed("AVAX/USD", "0x0A77230d17318075983913bC2145DB16C7366156", "AVAX / USD", 8, Crypto),
            feed("ETH/USD", "0x976B3D034E162d8bD72D6b9C989d545b839003b0", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x2779D32d5166BAaa2B2b658333bA7e6Ec0C65743", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x49ccd9ca821EfEab2b98c60dC60F518E765EDe9a", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0xF096872672F44d6EBA71458D74fe67F9a77a23B9", "USDC / USD", 8, Crypto),
            feed("USDT/USD", "0xEBE676ee90Fe1112671f19b6B7459bC678B67e8a", "USDT / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::AvalancheFuji,
        vec![
            feed("AVAX/USD", "0x5498BB86BC934c8D34FDA08E81D444153d0D06aD", "AVAX / USD", 8, Crypto),
            feed("ETH/USD", "0x86d67c3D38D2bCeE722E601025C25a575021c6EA", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x31CF013A08c6Ac228C94551d535d5BAfE19c602a", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x34C4c526902d88a3Aa98DB8a9b802603EB1E3470", "LINK / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::BnbMainnet,
        vec![
            feed("BNB/USD", "0x0567F2323251f0Aab15c8dFb1967E4e8A7D42aeE", "BNB / USD", 8, Crypto),
            feed("ETH/USD", "0x9ef1B8c0E4F7dc8bF5719Ea496883DC6401d5b2e", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x264990fbd0A4796A3E3d8E37C4d5F87a3aCa5Ebf", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xca236E327F629f9Fc2c30A4E95775EbF0B89fac8", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0x51597f405303C4377E36123cBc172b13269EA163", "USDC / USD", 8, Crypto),
            feed("USDT/USD", "0xB97Ad0E74fa7d920791E90258A6E2085088b4320", "USDT / USD", 8, Crypto),
            feed("BUSD/USD", "0xcBb98864Ef56E9042e7d2efef76141f15731B82f", "BUSD / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::BnbTestnet,
        vec![
            feed("BNB/USD", "0x2514895c72f50D8bd4B4F9b1110F0D6bD2c97526", "BNB / USD", 8, Crypto),
            feed("ETH/USD", "0x143db3CEEfbdfe5631aDD3E50f7614B6ba708BA7", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x5741306c21795FdCBb9b265Ea0255F499DFe515C", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x1B329402Cb1825C6F30A0d92aB9E2862BE47333f", "LINK / USD", 8, Crypto),
        ],
    );

    feeds.insert(
        Network::BaseMainnet,
        vec![
            feed("ETH/USD", "0x71041dddad3595F9CEd3DcCFBe3D1F4b0a16Bb70", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x64c911996D3c6aC71E9b8932F89C3fC7Bf4c8B5e", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0x17CAb8FE31E32f08326e5E27412894e49B0f9D65", "LINK / USD", 8, Crypto),
            feed("USDC/USD", "0x7e860098F58bBFC8648a4311b374B1D669a2bc6B", "USDC / USD", 8, Crypto),
            feed("CBETH/USD", "0xd7818272B9e248357d13057AAb0B417aF31E817d", "cbETH / USD", 8, Crypto),
            feed(SEQUENCER_UPTIME_KEY, "0xBCF85224fc0756B9Fa45aA7892530B47e10b6433", "Sequencer Uptime", 0, Other),
        ],
    );

    feeds.insert(
        Network::BaseSepolia,
        vec![
            feed("ETH/USD", "0x4aDC67696bA383F43DD60A9e78F2C97Fbbfc7cb1", "ETH / USD", 8, Crypto),
            feed("BTC/USD", "0x0FB99723Aee6f420beAD13e6bBB79b7E6F034298", "BTC / USD", 8, Crypto),
            feed("LINK/USD", "0xb113F5A928BCfF189C998ab20d753a47F9dE5A61", "LINK / USD", 8, Crypto),
        ],
    );

    feeds
});

static SEQUENCER_FEEDS: Lazy<Vec<SequencerFeedInfo>> = Lazy::new(|| {
    vec![
        SequencerFeedInfo {
            network: "arbitrum-mainnet",
            address: "0xFdB631F5EE196F0ed6FAa767959853A9F217697D",
        },
        SequencerFeedInfo {
            network: "optimism-mainnet",
            address: "0x371EAD81c9102C9BF4874A9075FFFf170F2Ee389",
        },
        SequencerFeedInfo {
            network: "base-mainnet",
            address: "0xBCF85224fc0756B9Fa45aA7892530B47e10b6433",
        },
        SequencerFeedInfo {
            network: "metis-mainnet",
            address: "0x58218ea7422255EBE94e56b504035a784b7AA7A8",
        },
    ]
});

const fn data_feed(key: &'static str, address: &'static str, name: &'static str, decimals: u32) -> DataFeedInfo {
    DataFeedInfo {
        key,
        address,
        name,
        decimals,
    }
}

static PROOF_OF_RESERVE_FEEDS: Lazy<HashMap<Network, Vec<DataFeedInfo>>> = Lazy::new(|| {
    let mut feeds = HashMap::new();
    feeds.insert(
        Network::EthereumMainnet,
        vec![
            data_feed("WBTC", "0xa81FE04086865e63E12dD3776978E49DEEa2ea4e", "WBTC Reserve", 8),
            data_feed("TUSD", "0x478f4c42b877c697C4b19E396865D4D533EcB6ea", "TUSD Reserve", 18),
            data_feed("USDC", "0x2c78EFd57d907D8C16A1d17F3C9Bc6fE9DE86E6a", "USDC Reserve", 18),
        ],
    );
    feeds
});

static NFT_FLOOR_FEEDS: Lazy<HashMap<Network, Vec<DataFeedInfo>>> = Lazy::new(|| {
    let mut feeds = HashMap::new();
    feeds.insert(
        Network::EthereumMainnet,
        vec![
            data_feed("BAYC", "0xB677bfBc9B09a3469695f40477d05bc9BcB15F50", "Bored Ape Yacht Club", 18),
            data_feed("CRYPTOPUNKS", "0x01B6710B01cF3dd8Ae64243097d91aFb03728Fdd", "CryptoPunks", 18),
            data_feed("MAYC", "0x1823C89715Fe3fB96A24d11c917aCA918894A090", "Mutant Ape Yacht Club", 18),
            data_feed("AZUKI", "0xA8B9A447C73191744D5B79BcE864F343455E1150", "Azuki", 18),
            data_feed("DOODLES", "0x027828052840a43Cc2D0187BcfA6e3D6AcE60336", "Doodles", 18),
        ],
    );
    feeds
});

/// Denomination addresses understood by the feed registry
static REGISTRY_ASSETS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ETH", "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"),
        ("BTC", "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"),
        ("LINK", "0x514910771AF9Ca656af840dff83E8264EcF986CA"),
        ("AAVE", "0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9"),
        ("UNI", "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
        ("COMP", "0xc00e94Cb662C3520282E6f5717214004A7f26888"),
        ("MKR", "0x9f8F72aA9304c8B593d555F12eF6589cC3A579A2"),
        ("SNX", "0xC011a73ee8576Fb46F5E1c5751cA3B9Fe0af2a6F"),
        ("USD", "0x0000000000000000000000000000000000000348"),
        ("EUR", "0x000000000000000000000000000000000000007f"),
        ("GBP", "0x000000000000000000000000000000000000033a"),
        ("JPY", "0x0000000000000000000000000000000000000188"),
    ])
});

/// Normalize a pair key: `eth / usd` -> `ETH/USD`
pub fn normalize_pair(pair: &str) -> String {
    pair.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Static configuration for a network
pub fn network_info(network: Network) -> Option<&'static NetworkInfo> {
    NETWORKS.get(&network)
}

/// Look up a network by chain id
pub fn network_by_chain_id(chain_id: u64) -> Option<&'static NetworkInfo> {
    Network::all()
        .iter()
        .filter_map(|network| NETWORKS.get(network))
        .find(|info| info.chain_id == chain_id && info.network != Network::Custom)
}

/// Preset price feeds available on a network
pub fn network_price_feeds(network: Network) -> &'static [PriceFeedInfo] {
    PRICE_FEEDS
        .get(&network)
        .map(|feeds| feeds.as_slice())
        .unwrap_or(&[])
}

/// Look up a preset price feed
pub fn price_feed(network: Network, pair: &str) -> Result<&'static PriceFeedInfo> {
    let key = normalize_pair(pair);
    network_price_feeds(network)
        .iter()
        .find(|feed| feed.key == key)
        .ok_or_else(|| CoreError::feed_not_found(network.key(), pair))
}

/// All known L2 sequencer uptime feeds
pub fn sequencer_feeds() -> &'static [SequencerFeedInfo] {
    SEQUENCER_FEEDS.as_slice()
}

/// L2 sequencer uptime feed for a network
pub fn sequencer_feed(network: Network) -> Result<&'static SequencerFeedInfo> {
    SEQUENCER_FEEDS
        .iter()
        .find(|feed| feed.network == network.key())
        .ok_or_else(|| CoreError::service_unavailable("L2 sequencer uptime feed", network.key()))
}

/// Preset Proof of Reserve or NFT floor price feeds on a network
pub fn network_data_feeds(network: Network, kind: DataFeedKind) -> &'static [DataFeedInfo] {
    let table = match kind {
        DataFeedKind::ProofOfReserve => &PROOF_OF_RESERVE_FEEDS,
        DataFeedKind::NftFloorPrice => &NFT_FLOOR_FEEDS,
    };
    table.get(&network).map(|feeds| feeds.as_slice()).unwrap_or(&[])
}

/// Look up a preset Proof of Reserve or NFT floor price feed by key
pub fn data_feed_entry(network: Network, kind: DataFeedKind, key: &str) -> Result<&'static DataFeedInfo> {
    let normalized = normalize_pair(key);
    network_data_feeds(network, kind)
        .iter()
        .find(|feed| feed.key == normalized)
        .ok_or_else(|| CoreError::feed_not_found(network.key(), key))
}

/// Registry denomination for a symbol such as `ETH` or `USD`; anything else
/// must be a token address
pub fn registry_asset(asset: &str) -> Result<Address> {
    match REGISTRY_ASSETS.get(normalize_pair(asset).as_str()) {
        Some(address) => parse_address(address),
        None => parse_address(asset),
    }
}
