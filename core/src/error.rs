//! Error types for the sentinel core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the decimal engine, round data helpers and the catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid unit: {0}. Valid units: wei, kwei, mwei, gwei, szabo, finney, ether")]
    InvalidUnit(String),

    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid round id: {0}")]
    InvalidRoundId(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Price feed {pair} not available on {network}")]
    FeedNotFound { network: String, pair: String },

    #[error("{service} not available on {network}")]
    ServiceUnavailable { service: String, network: String },
}

impl CoreError {
    /// Create an invalid decimal error
    pub fn invalid_decimal<S: Into<String>>(value: S) -> Self {
        Self::InvalidDecimal(value.into())
    }

    /// Create a feed-not-found error
    pub fn feed_not_found<S: Into<String>>(network: S, pair: S) -> Self {
        Self::FeedNotFound {
            network: network.into(),
            pair: pair.into(),
        }
    }

    /// Create a service-unavailable error
    pub fn service_unavailable<S: Into<String>>(service: S, network: S) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            network: network.into(),
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::DivisionByZero => "arithmetic",
            CoreError::InvalidUnit(_) => "validation",
            CoreError::InvalidDecimal(_) => "validation",
            CoreError::InvalidRoundId(_) => "validation",
            CoreError::InvalidNetwork(_) => "validation",
            CoreError::InvalidAddress(_) => "validation",
            CoreError::FeedNotFound { .. } => "catalog",
            CoreError::ServiceUnavailable { .. } => "catalog",
        }
    }
}
