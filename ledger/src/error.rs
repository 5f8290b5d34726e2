//! Error types for the ledger facade

use thiserror::Error;

use sentinel_core::CoreError;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised while reading oracle contracts
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Feed unavailable: {feed} - {reason}")]
    FeedUnavailable { feed: String, reason: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Invalid RPC endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Ethereum client error: {0}")]
    Transport(#[from] ethers::providers::ProviderError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl LedgerError {
    /// Create a new feed unavailable error
    pub fn feed_unavailable<F: ToString, S: Into<String>>(feed: F, reason: S) -> Self {
        Self::FeedUnavailable {
            feed: feed.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(message: S) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a new invalid endpoint error
    pub fn invalid_endpoint<S: Into<String>>(url: S, message: S) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            LedgerError::FeedUnavailable { .. } => "feed_unavailable",
            LedgerError::Decode { .. } => "decode",
            LedgerError::Encode { .. } => "encode",
            LedgerError::InvalidEndpoint { .. } => "config",
            LedgerError::Transport(_) => "blockchain",
            LedgerError::Core(err) => err.category(),
        }
    }
}
