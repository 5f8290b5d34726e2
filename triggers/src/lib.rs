//! # Sentinel Triggers
//!
//! Polling event engine for oracle feeds. Each subscription keeps a small
//! cursor between polls; detectors compare fresh reads against it and emit
//! price moves, threshold alerts, new rounds, VRF fulfillments, automation
//! performs and L2 sequencer status changes.

pub mod config;
pub mod cursor;
pub mod detectors;
pub mod error;
pub mod events;
pub mod poller;
pub mod store;
pub mod subscription;

// Re-export commonly used types
pub use config::{SentinelConfig, StateBackend};
pub use cursor::{PollCursor, StateBag, StateValue};
pub use detectors::Detection;
pub use error::{Result, TriggerError};
pub use events::{ChangeDirection, EmittedEvent, EventPayload};
pub use poller::TriggerPoller;
pub use store::{MemoryStateStore, RedisStateStore, StateStore};
pub use subscription::{
    FeedSource, ResolvedSubscription, ResolvedTrigger, Subscription, ThresholdMode, TriggerSpec,
};

/// Current version of the trigger engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
