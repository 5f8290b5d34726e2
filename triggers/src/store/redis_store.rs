use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use super::StateStore;
use crate::cursor::StateBag;
use crate::Result;

/// Default key namespace
pub const DEFAULT_KEY_PREFIX: &str = "sentinel";

/// Redis-backed store. Each bag is a JSON string under `<prefix>:cursor:<key>`.
#[derive(Clone)]
pub struct RedisStateStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStateStore {
    /// Connect and verify the server answers
    pub async fn connect(url: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let mut conn = client.get_connection_manager().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(response = %pong, "Redis ping");

        info!(url, prefix, "Connected to Redis state store");
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    /// Namespaced cursor key
    pub fn key(&self, suffix: &str) -> String {
        cursor_key(&self.prefix, suffix)
    }
}

fn cursor_key(prefix: &str, suffix: &str) -> String {
    format!("{}:cursor:{}", prefix, suffix)
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, key: &str) -> Result<StateBag> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(self.key(key)).await?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(StateBag::new()),
        }
    }

    async fn set(&self, key: &str, bag: StateBag) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&bag)?;
        conn.set::<_, _, ()>(self.key(key), json).await?;
        debug!(key, fields = bag.len(), "Stored cursor");
        Ok(())
    }
}
