//! AI 分析结果缓存
//!
//! `insights:{code}` 哈希，字段 `category` / `summary`。无 TTL，
//! 直到同一短码被重新生成时失效。

use std::sync::Arc;

use tracing::{trace, warn};

use super::backend::{KeySpace, KvStore};
use super::models::Insight;
use crate::errors::Result;

#[derive(Clone)]
pub struct InsightCache {
    kv: Arc<dyn KvStore>,
    keys: KeySpace,
}

impl InsightCache {
    pub fn new(kv: Arc<dyn KvStore>, keys: KeySpace) -> Self {
        Self { kv, keys }
    }

    /// 覆盖写入
    pub async fn save_insights(&self, code: &str, insight: &Insight) -> Result<()> {
        self.kv
            .hset(
                &self.keys.insights(code),
                &[
                    (Insight::CATEGORY_FIELD, insight.category.as_str()),
                    (Insight::SUMMARY_FIELD, insight.summary.as_str()),
                ],
            )
            .await?;
        trace!("Saved insights for {}", code);
        Ok(())
    }

    pub async fn get_insights(&self, code: &str) -> Result<Option<Insight>> {
        let mut hash = self.kv.hgetall(&self.keys.insights(code)).await?;
        if hash.is_empty() {
            return Ok(None);
        }

        match (
            hash.remove(Insight::CATEGORY_FIELD),
            hash.remove(Insight::SUMMARY_FIELD),
        ) {
            (Some(category), Some(summary)) => Ok(Some(Insight { category, summary })),
            _ => {
                warn!("Incomplete insight record for {}, ignoring", code);
                Ok(None)
            }
        }
    }

    /// 删除旧的分析结果，返回是否存在
    pub async fn invalidate(&self, code: &str) -> Result<bool> {
        self.kv.del(&self.keys.insights(code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn cache() -> (InsightCache, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        (InsightCache::new(kv.clone(), KeySpace::default()), kv)
    }

    #[tokio::test]
    async fn test_absent_until_saved() {
        let (cache, _) = cache();
        assert_eq!(cache.get_insights("abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (cache, _) = cache();
        cache
            .save_insights("abc123", &Insight::new("News", "Daily headlines"))
            .await
            .unwrap();
        cache
            .save_insights("abc123", &Insight::new("Tech", "Developer docs"))
            .await
            .unwrap();

        assert_eq!(
            cache.get_insights("abc123").await.unwrap(),
            Some(Insight::new("Tech", "Developer docs"))
        );
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (cache, _) = cache();
        cache
            .save_insights("abc123", &Insight::new("Tech", "Docs"))
            .await
            .unwrap();

        assert!(cache.invalidate("abc123").await.unwrap());
        assert!(!cache.invalidate("abc123").await.unwrap());
        assert_eq!(cache.get_insights("abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_partial_hash_is_absent() {
        let (cache, kv) = cache();
        kv.hset("insights:abc123", &[("category", "Tech")])
            .await
            .unwrap();
        assert_eq!(cache.get_insights("abc123").await.unwrap(), None);
    }
}
