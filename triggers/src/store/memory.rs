use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::StateStore;
use crate::cursor::StateBag;
use crate::Result;

/// Process-local store; cursors are lost on restart
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    bags: RwLock<HashMap<String, StateBag>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cursors
    pub fn len(&self) -> usize {
        self.bags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.read().is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<StateBag> {
        Ok(self.bags.read().get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, bag: StateBag) -> Result<()> {
        self.bags.write().insert(key.to_string(), bag);
        Ok(())
    }
}
