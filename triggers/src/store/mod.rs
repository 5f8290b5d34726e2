//! Cursor persistence backends

mod memory;
mod redis_store;

pub use self::memory::MemoryStateStore;
pub use self::redis_store::{RedisStateStore, DEFAULT_KEY_PREFIX};

use async_trait::async_trait;

use crate::cursor::StateBag;
use crate::Result;

/// Key-value store holding one cursor bag per subscription and event kind
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a bag; absent keys yield an empty bag
    async fn get(&self, key: &str) -> Result<StateBag>;

    /// Replace a bag, last write wins
    async fn set(&self, key: &str, bag: StateBag) -> Result<()>;
}
