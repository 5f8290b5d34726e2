//! # Sentinel Ledger
//!
//! Read-only facade over oracle contracts (aggregators, VRF coordinators,
//! automation registries, ERC20 tokens) and the feed reader built on it.

pub mod abi;
pub mod client;
pub mod error;
pub mod ethers_client;
pub mod reader;

// Re-export commonly used types
pub use client::LedgerClient;
pub use error::{LedgerError, Result};
pub use ethers_client::{EthersLedgerClient, DEFAULT_REQUEST_TIMEOUT};
pub use reader::{FeedReader, FeedSnapshot};

/// Current version of the ledger crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
