use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, error, trace};

use super::KvStore;
use crate::errors::{LinklensError, Result};

/// Redis 存储
///
/// 使用 `ConnectionManager`：断线自动重连，clone 成本低，
/// 所有请求共享同一条多路复用连接。
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// 连接 Redis 并执行一次 PING
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            LinklensError::store_connection(format!("Invalid Redis URL '{}': {}", url, e))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            error!(
                "Failed to connect to Redis: {}. Check Redis server status and URL: {}",
                e, url
            );
            LinklensError::store_connection(format!("Redis connection failed: {e}"))
        })?;

        let store = Self { conn };
        store.ping().await?;
        debug!("Redis connection established");
        Ok(store)
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn().get(key).await?;
        trace!("Redis GET {} -> {}", key, value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn().set(key, value).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let deleted: i64 = self.conn().del(key).await?;
        Ok(deleted > 0)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let value: i64 = self.conn().incr(key, 1).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let exists: bool = self.conn().exists(key).await?;
        Ok(exists)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let hash: HashMap<String, String> = self.conn().hgetall(key).await?;
        Ok(hash)
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<()> {
        let _: () = self.conn().hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn();
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        trace!("Redis PING -> {}", response);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
