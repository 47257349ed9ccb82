//! URL 映射与访问计数
//!
//! - `{code}` → 原始 URL
//! - `stats:{code}` → 访问次数

use std::sync::Arc;

use tracing::{debug, trace};

use super::backend::{KeySpace, KvStore};
use super::insight_cache::InsightCache;
use super::models::VisitStats;
use crate::errors::{LinklensError, Result};
use crate::utils::generate_short_code;

#[derive(Clone)]
pub struct UrlStore {
    kv: Arc<dyn KvStore>,
    keys: KeySpace,
    insights: InsightCache,
    code_length: usize,
}

impl UrlStore {
    pub fn new(
        kv: Arc<dyn KvStore>,
        keys: KeySpace,
        insights: InsightCache,
        code_length: usize,
    ) -> Self {
        Self {
            kv,
            keys,
            insights,
            code_length,
        }
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    pub fn backend(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    /// 保存 URL 并返回短码
    ///
    /// 覆盖映射、清除旧的分析结果；访问计数仅在不存在时初始化为 0，
    /// 重复缩短同一 URL 会保留历史访问数。
    pub async fn save_url(&self, url: &str) -> Result<String> {
        let code = generate_short_code(url, self.code_length);

        self.kv.set(&self.keys.url(&code), url).await?;

        if self.insights.invalidate(&code).await? {
            debug!("Invalidated stale insights for {}", code);
        }

        let stats_key = self.keys.stats(&code);
        if !self.kv.exists(&stats_key).await? {
            self.kv.set(&stats_key, "0").await?;
        }

        trace!("Saved {} -> {}", code, url);
        Ok(code)
    }

    /// 未知短码返回 `Ok(None)`
    pub async fn get_original_url(&self, code: &str) -> Result<Option<String>> {
        self.kv.get(&self.keys.url(code)).await
    }

    /// 访问计数 +1，未知短码从 1 开始
    pub async fn increment_visits(&self, code: &str) -> Result<u64> {
        let count = self.kv.incr(&self.keys.stats(code)).await?;
        u64::try_from(count).map_err(|_| {
            LinklensError::store(format!("visit counter for '{}' is negative: {}", code, count))
        })
    }

    pub async fn get_stats(&self, code: &str) -> Result<VisitStats> {
        let visits = match self.kv.get(&self.keys.stats(code)).await? {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                LinklensError::store(format!(
                    "visit counter for '{}' is not an integer: {}",
                    code, raw
                ))
            })?,
            None => 0,
        };
        Ok(VisitStats { visits })
    }
}
