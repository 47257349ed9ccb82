//! Analytics service
//!
//! 组合短码生成、URL 存储与分析缓存，提供 shorten / redirect / stats 三个操作。
//! 自身不持有状态，HTTP 与 CLI 共用同一套业务逻辑。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, trace};

use crate::errors::{LinklensError, Result};
use crate::services::enrichment::{
    ContentFetcher, EnrichmentDispatcher, EnrichmentProvider, EnrichmentSettings,
};
use crate::storage::{Insight, InsightCache, KeySpace, KvStore, UrlRecord, UrlStore};

/// Joined view returned by the stats endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlStats {
    #[serde(rename = "short_code")]
    pub code: String,
    pub original_url: String,
    pub visits: u64,
    /// `null` until enrichment completes (or forever, when disabled)
    pub ai_insights: Option<Insight>,
}

pub struct AnalyticsService {
    urls: UrlStore,
    insights: InsightCache,
    dispatcher: EnrichmentDispatcher,
}

impl AnalyticsService {
    pub fn new(urls: UrlStore, insights: InsightCache, dispatcher: EnrichmentDispatcher) -> Self {
        Self {
            urls,
            insights,
            dispatcher,
        }
    }

    /// 从一个 KV 后端装配完整的服务
    pub fn from_store(
        kv: Arc<dyn KvStore>,
        keys: KeySpace,
        code_length: usize,
        provider: Option<Arc<dyn EnrichmentProvider>>,
        fetcher: Option<Arc<dyn ContentFetcher>>,
        settings: EnrichmentSettings,
    ) -> Self {
        let insights = InsightCache::new(kv.clone(), keys.clone());
        let urls = UrlStore::new(kv, keys, insights.clone(), code_length);
        let dispatcher = EnrichmentDispatcher::new(provider, fetcher, insights.clone(), settings);
        Self::new(urls, insights, dispatcher)
    }

    pub fn dispatcher(&self) -> &EnrichmentDispatcher {
        &self.dispatcher
    }

    pub fn url_store(&self) -> &UrlStore {
        &self.urls
    }

    /// 缩短 URL
    ///
    /// 写入成功后调度后台分析并立即返回，响应不依赖分析结果。
    pub async fn shorten(&self, url: &str) -> Result<UrlRecord> {
        let code = self.save(url).await?;
        self.dispatcher.dispatch(code.clone(), url.to_string());

        Ok(UrlRecord {
            code,
            original_url: url.to_string(),
        })
    }

    /// 缩短 URL 但不调度分析，由调用方决定何时（是否）运行 `dispatcher().run()`
    pub async fn shorten_without_enrichment(&self, url: &str) -> Result<UrlRecord> {
        let code = self.save(url).await?;
        Ok(UrlRecord {
            code,
            original_url: url.to_string(),
        })
    }

    async fn save(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(LinklensError::validation("URL is required"));
        }

        let code = self.urls.save_url(url).await.map_err(|e| {
            error!("Error saving URL: {}", e);
            e
        })?;
        info!("Shortened {} to {}", url, code);
        Ok(code)
    }

    /// 查找跳转目标
    ///
    /// 计数失败只记录日志：计数可以不准，跳转不能失败。
    pub async fn redirect_target(&self, code: &str) -> Result<String> {
        let url = self.resolve_target(code).await?;

        match self.urls.increment_visits(code).await {
            Ok(visits) => trace!("Visit #{} for {}", visits, code),
            Err(e) => error!("Error incrementing stats for {}: {}", code, e),
        }

        Ok(url)
    }

    /// 只查找跳转目标，不计数（HEAD 请求使用）
    pub async fn resolve_target(&self, code: &str) -> Result<String> {
        self.urls
            .get_original_url(code)
            .await?
            .ok_or_else(|| LinklensError::not_found(format!("URL not found: {}", code)))
    }

    /// 统计信息：访问数 + AI 分析结果
    ///
    /// 两次读取之间不是快照，并发跳转可能让 visits 比分析结果“新”一点。
    pub async fn stats(&self, code: &str) -> Result<UrlStats> {
        let original_url = self.resolve_target(code).await?;

        let visits = self.urls.get_stats(code).await?.visits;
        let ai_insights = self.insights.get_insights(code).await?;

        Ok(UrlStats {
            code: code.to_string(),
            original_url,
            visits,
            ai_insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::utils::code::DEFAULT_CODE_LENGTH;
    use async_trait::async_trait;
    use std::time::Duration;

    struct JsonProvider(&'static str);

    #[async_trait]
    impl EnrichmentProvider for JsonProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &'static str {
            "json"
        }
    }

    fn service(provider: Option<Arc<dyn EnrichmentProvider>>) -> AnalyticsService {
        AnalyticsService::from_store(
            Arc::new(MemoryStore::new()),
            KeySpace::default(),
            DEFAULT_CODE_LENGTH,
            provider,
            None,
            EnrichmentSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_shorten_redirect_stats() {
        let svc = service(None);
        let result = svc.shorten("https://example.com").await.unwrap();
        assert_eq!(result.code, "c984d0");
        assert_eq!(result.original_url, "https://example.com");

        for _ in 0..3 {
            assert_eq!(
                svc.redirect_target("c984d0").await.unwrap(),
                "https://example.com"
            );
        }

        let stats = svc.stats("c984d0").await.unwrap();
        assert_eq!(stats.visits, 3);
        assert_eq!(stats.ai_insights, None);
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected() {
        let svc = service(None);
        for input in ["", "   "] {
            let err = svc.shorten(input).await.unwrap_err();
            assert!(matches!(err, LinklensError::Validation(_)));
            assert_eq!(err.message(), "URL is required");
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let svc = service(None);
        assert!(matches!(
            svc.redirect_target("ffffff").await.unwrap_err(),
            LinklensError::NotFound(_)
        ));
        assert!(matches!(
            svc.stats("ffffff").await.unwrap_err(),
            LinklensError::NotFound(_)
        ));
        // 未知短码的跳转不计数
        assert_eq!(svc.url_store().get_stats("ffffff").await.unwrap().visits, 0);
    }

    #[tokio::test]
    async fn test_insights_appear_after_enrichment() {
        let svc = service(Some(Arc::new(JsonProvider(
            r#"{"category":"Tech","summary":"Example domain"}"#,
        ))));
        let result = svc.shorten("https://example.com").await.unwrap();
        assert!(svc.dispatcher().wait_idle(Duration::from_secs(5)).await);

        let stats = svc.stats(&result.code).await.unwrap();
        assert_eq!(stats.ai_insights, Some(Insight::new("Tech", "Example domain")));
    }

    #[test]
    fn test_stats_serializes_short_code() {
        let stats = UrlStats {
            code: "c984d0".to_string(),
            original_url: "https://example.com".to_string(),
            visits: 2,
            ai_insights: None,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["short_code"], "c984d0");
        assert_eq!(value["visits"], 2);
        assert!(value["ai_insights"].is_null());
    }
}
