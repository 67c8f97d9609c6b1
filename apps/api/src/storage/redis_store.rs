use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client as RedisClient;
use tracing::info;

use super::{ResumeStore, StoreError};

/// Redis-backed slot: a plain string value under `key`.
///
/// Holds one `ConnectionManager`; clones share the underlying multiplexed
/// connection, which reconnects on its own after a drop.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisStore {
    pub async fn connect(client: RedisClient, key: impl Into<String>) -> Result<Self, StoreError> {
        let conn = ConnectionManager::new(client).await?;
        info!("Redis connection established");
        Ok(Self {
            conn,
            key: key.into(),
        })
    }
}

#[async_trait]
impl ResumeStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn read_raw(&self) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(&self.key).await?;
        Ok(value)
    }

    async fn write_raw(&self, value: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&self.key, value).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&self.key).await?;
        Ok(())
    }
}
