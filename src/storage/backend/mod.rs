//! 键值存储后端
//!
//! URL Store 与 Insight Cache 共用同一个键值存储。每个操作单独保证原子性，
//! 不提供跨 key 事务。

mod memory;
mod redis_store;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StoreConfig, StoreType};
use crate::errors::Result;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// String and hash operations the engine needs from its backing store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether the key existed.
    async fn del(&self, key: &str) -> Result<bool>;

    /// Atomically increments an integer string; a missing key starts at 0.
    async fn incr(&self, key: &str) -> Result<i64>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Empty map when the key is absent.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<()>;

    /// 连通性检查（health / 启动时使用）
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// 键名空间：`{code}`、`stats:{code}`、`insights:{code}`
#[derive(Debug, Clone, Default)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn url(&self, code: &str) -> String {
        format!("{}{}", self.prefix, code)
    }

    pub fn stats(&self, code: &str) -> String {
        format!("{}stats:{}", self.prefix, code)
    }

    pub fn insights(&self, code: &str) -> String {
        format!("{}insights:{}", self.prefix, code)
    }
}

pub struct StoreFactory;

impl StoreFactory {
    pub async fn create(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match config.store_type {
            StoreType::Redis => Arc::new(RedisStore::connect(&config.redis_url).await?),
            StoreType::Memory => Arc::new(MemoryStore::new()),
        };
        info!("Using store backend: {}", store.backend_name());
        Ok(store)
    }
}
