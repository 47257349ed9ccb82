//! 进程内存储
//!
//! 用 DashMap 模拟 Redis 的 string / hash 语义，用于单机部署和测试。
//! 每个操作只持有单个分片锁，因此单 key 操作是原子的。

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use super::KvStore;
use crate::errors::{LinklensError, Result};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}

fn wrong_type(key: &str) -> LinklensError {
    LinklensError::store(format!(
        "WRONGTYPE operation against key '{}' holding the wrong kind of value",
        key
    ))
}

#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前 key 数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.data.get(key).as_deref() {
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(Value::Hash(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // SET 覆盖任何类型
        self.data
            .insert(key.to_string(), Value::Str(value.to_string()));
        trace!("MemoryStore: SET {}", key);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        Ok(self.data.remove(key).is_some())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        match self.data.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Str(s) => {
                    let current: i64 = s.parse().map_err(|_| {
                        LinklensError::store(format!(
                            "value at '{}' is not an integer or out of range",
                            key
                        ))
                    })?;
                    let next = current.checked_add(1).ok_or_else(|| {
                        LinklensError::store(format!("increment at '{}' would overflow", key))
                    })?;
                    *s = next.to_string();
                    Ok(next)
                }
                Value::Hash(_) => Err(wrong_type(key)),
            },
            Entry::Vacant(entry) => {
                entry.insert(Value::Str("1".to_string()));
                Ok(1)
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        match self.data.get(key).as_deref() {
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(Value::Str(_)) => Err(wrong_type(key)),
            None => Ok(HashMap::new()),
        }
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<()> {
        match self.data.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Hash(h) => {
                    for (field, value) in fields {
                        h.insert(field.to_string(), value.to_string());
                    }
                    Ok(())
                }
                Value::Str(_) => Err(wrong_type(key)),
            },
            Entry::Vacant(entry) => {
                let hash = fields
                    .iter()
                    .map(|(f, v)| (f.to_string(), v.to_string()))
                    .collect();
                entry.insert(Value::Hash(hash));
                Ok(())
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
