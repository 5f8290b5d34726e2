//! Error types for the trigger engine

use thiserror::Error;

use sentinel_core::CoreError;
use sentinel_ledger::LedgerError;

/// Result type alias for trigger operations
pub type Result<T> = std::result::Result<T, TriggerError>;

/// Errors raised while polling subscriptions
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("State store error: {message}")]
    Store { message: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Corrupt poll cursor: {message}")]
    Cursor { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TriggerError {
    /// Create a state store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a cursor error
    pub fn cursor<S: Into<String>>(message: S) -> Self {
        Self::Cursor {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// A failed poll leaves the cursor untouched, so retryable errors are
    /// simply retried on the next tick.
    pub fn is_retryable(&self) -> bool {
        match self {
            TriggerError::Ledger(err) => err.is_retryable(),
            TriggerError::Redis(_) | TriggerError::Store { .. } | TriggerError::Io(_) => true,
            _ => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TriggerError::Ledger(err) => err.category(),
            TriggerError::Core(err) => err.category(),
            TriggerError::Store { .. } | TriggerError::Redis(_) => "state",
            TriggerError::Serialization(_) => "serialization",
            TriggerError::Config(_) | TriggerError::InvalidConfig { .. } => "config",
            TriggerError::Cursor { .. } => "cursor",
            TriggerError::Io(_) => "io",
        }
    }
}
