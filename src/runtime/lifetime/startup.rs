use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::services::enrichment::{build_fetcher, build_provider};
use crate::services::{AnalyticsService, EnrichmentSettings};
use crate::storage::{KeySpace, StoreFactory};

pub struct StartupContext {
    pub analytics_service: Arc<AnalyticsService>,
}

/// 准备运行时依赖：存储、provider、fetcher、调度器
///
/// Server 与 CLI 共用。Provider 是否可用只在这里判定一次。
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let kv = StoreFactory::create(&config.store)
        .await
        .context("Failed to create store backend")?;

    if !config.store.key_prefix.is_empty() {
        info!("Using key prefix: {}", config.store.key_prefix);
    }

    let code_length = config.shortener.effective_code_length();
    if code_length != config.shortener.code_length {
        warn!(
            "shortener.code_length {} out of range, using {}",
            config.shortener.code_length, code_length
        );
    }

    let provider = build_provider(&config.enrichment);
    let fetcher = if provider.is_some() {
        build_fetcher(&config.enrichment)
    } else {
        None
    };

    let analytics_service = Arc::new(AnalyticsService::from_store(
        kv,
        KeySpace::new(config.store.key_prefix.clone()),
        code_length,
        provider,
        fetcher,
        EnrichmentSettings::from(&config.enrichment),
    ));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { analytics_service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreType;

    #[tokio::test]
    async fn test_prepare_startup_with_memory_store() {
        let mut config = StaticConfig::default();
        config.store.store_type = StoreType::Memory;
        config.shortener.code_length = 8;

        let ctx = prepare_startup(&config).await.unwrap();
        let service = &ctx.analytics_service;
        assert_eq!(service.url_store().code_length(), 8);
        assert!(!service.dispatcher().is_enabled());

        let result = service.shorten("https://example.com").await.unwrap();
        assert_eq!(result.code, "c984d06a");
    }
}
