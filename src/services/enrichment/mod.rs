//! AI 分析调度
//!
//! 每次缩短请求触发一次后台分析：
//! `Scheduled -> Running -> {Completed, Skipped, Failed}`，终态不重试。
//!
//! 调度是 fire-and-forget：调用方既不等待也观察不到结果，唯一可见的效果是
//! 之后出现的 `insights:{code}`。重新缩短同一 URL 时不会取消正在进行的分析，
//! 旧任务晚到的写入可能覆盖刚刚的失效操作，这是可接受的竞态。

pub mod fetcher;
pub mod parser;
pub mod prompt;
pub mod provider;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

use crate::config::EnrichmentConfig;
use crate::errors::Result;
use crate::storage::{Insight, InsightCache};

pub use fetcher::{ContentFetcher, HttpContentFetcher, build_fetcher};
pub use parser::parse_insight;
pub use prompt::build_prompt;
pub use provider::{EnrichmentProvider, GeminiProvider, build_provider};

/// 一次分析的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Completed(Insight),
    /// Provider 未配置（全局禁用）
    Skipped,
    Failed(String),
}

impl EnrichmentOutcome {
    pub fn state(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub max_context_chars: usize,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            max_context_chars: 2000,
        }
    }
}

impl From<&EnrichmentConfig> for EnrichmentSettings {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            max_context_chars: config.max_context_chars,
        }
    }
}

struct DispatcherInner {
    provider: Option<Arc<dyn EnrichmentProvider>>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    insights: InsightCache,
    settings: EnrichmentSettings,
    /// 正在运行的后台任务数（仅供关闭时等待，不做背压）
    in_flight: AtomicUsize,
    idle: Notify,
    /// 后台任务所在的 runtime，未绑定时跟随调用方
    runtime: OnceLock<Handle>,
}

/// 任务结束（包括 panic）时减少计数
struct InFlightGuard(Arc<DispatcherInner>);

impl InFlightGuard {
    fn new(inner: &Arc<DispatcherInner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        Self(inner.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

#[derive(Clone)]
pub struct EnrichmentDispatcher {
    inner: Arc<DispatcherInner>,
}

impl EnrichmentDispatcher {
    /// `provider == None` 表示分析功能全局禁用（启动时决定一次）
    pub fn new(
        provider: Option<Arc<dyn EnrichmentProvider>>,
        fetcher: Option<Arc<dyn ContentFetcher>>,
        insights: InsightCache,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                provider,
                fetcher,
                insights,
                settings,
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                runtime: OnceLock::new(),
            }),
        }
    }

    /// 禁用状态的调度器：每次运行都是 `Skipped`
    pub fn disabled(insights: InsightCache) -> Self {
        Self::new(None, None, insights, EnrichmentSettings::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.provider.is_some()
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.inner.provider.as_ref().map(|p| p.name())
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// 把后台任务固定到指定 runtime
    ///
    /// actix worker 的 runtime 在 server 停止时随之销毁，上面的任务会被直接丢弃。
    /// 服务器模式在创建 worker 之前绑定主 runtime，关闭时的等待才有意义。
    /// 只有第一次绑定生效。
    pub fn bind_runtime(&self, handle: Handle) {
        if self.inner.runtime.set(handle).is_err() {
            debug!("Enrichment runtime already bound, ignoring");
        }
    }

    /// 后台调度一次分析，立即返回
    ///
    /// Must be called from within a tokio runtime unless one was bound with
    /// [`bind_runtime`](Self::bind_runtime).
    pub fn dispatch(&self, code: String, url: String) {
        let guard = InFlightGuard::new(&self.inner);
        let dispatcher = self.clone();
        let span = info_span!("enrichment", code = %code);
        trace!("Enrichment scheduled for {}", code);

        let task = async move {
            let _guard = guard;
            dispatcher.run(&code, &url).await;
        }
        .instrument(span);

        match self.inner.runtime.get() {
            Some(handle) => {
                handle.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }

    /// 执行一次分析并返回终态
    ///
    /// 不会返回错误：任何失败都被收敛为 `Failed`，且不写入存储。
    pub async fn run(&self, code: &str, url: &str) -> EnrichmentOutcome {
        let Some(provider) = self.inner.provider.as_ref() else {
            debug!("AI enrichment disabled, skipping {}", code);
            return EnrichmentOutcome::Skipped;
        };

        trace!("Enrichment running for {} via {}", code, provider.name());
        match self.enrich(&**provider, code, url).await {
            Ok(insight) => {
                info!(
                    "AI Analysis for {} complete: category={}, summary={}",
                    code, insight.category, insight.summary
                );
                EnrichmentOutcome::Completed(insight)
            }
            Err(e) => {
                error!("AI Analysis failed for {}: {}", code, e);
                EnrichmentOutcome::Failed(e.to_string())
            }
        }
    }

    async fn enrich(
        &self,
        provider: &dyn EnrichmentProvider,
        code: &str,
        url: &str,
    ) -> Result<Insight> {
        let context = match self.inner.fetcher.as_ref() {
            Some(fetcher) => match fetcher.fetch_text(url).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Context fetch for {} failed, analyzing by URL only: {}", code, e);
                    None
                }
            },
            None => None,
        };

        let prompt = build_prompt(url, context.as_deref(), self.inner.settings.max_context_chars);
        let reply = provider.generate(&prompt).await?;
        let insight = parse_insight(&reply)?;
        self.inner.insights.save_insights(code, &insight).await?;
        Ok(insight)
    }

    /// 等待所有后台任务结束，超时返回 `false`
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                // 先注册再检查，避免错过 notify_waiters
                let notified = self.inner.idle.notified();
                if self.in_flight() == 0 {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LinklensError;
    use crate::storage::{KeySpace, KvStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticProvider {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StaticProvider {
        fn new(reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EnrichmentProvider for StaticProvider {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ContentFetcher for FailingFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Err(LinklensError::enrichment("offline"))
        }
    }

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl ContentFetcher for StaticFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn insight_cache() -> (InsightCache, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        (InsightCache::new(kv.clone(), KeySpace::default()), kv)
    }

    #[tokio::test]
    async fn test_disabled_run_is_skipped_without_writes() {
        let (insights, kv) = insight_cache();
        let dispatcher = EnrichmentDispatcher::disabled(insights);

        assert!(!dispatcher.is_enabled());
        assert_eq!(
            dispatcher.run("abc123", "https://example.com").await,
            EnrichmentOutcome::Skipped
        );
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_completed_run_saves_insight() {
        let (insights, _) = insight_cache();
        let provider = StaticProvider::new(Ok(
            "```json\n{\"category\":\"Tech\",\"summary\":\"Example domain\"}\n```".to_string(),
        ));
        let dispatcher = EnrichmentDispatcher::new(
            Some(provider.clone()),
            None,
            insights.clone(),
            EnrichmentSettings::default(),
        );

        let outcome = dispatcher.run("abc123", "https://example.com").await;
        assert_eq!(outcome.state(), "completed");
        assert_eq!(
            insights.get_insights("abc123").await.unwrap(),
            Some(Insight::new("Tech", "Example domain"))
        );
        assert!(provider.prompts.lock().unwrap()[0].contains("https://example.com"));
    }

    #[tokio::test]
    async fn test_provider_error_fails_without_writes() {
        let (insights, kv) = insight_cache();
        let provider = StaticProvider::new(Err(LinklensError::enrichment("quota exceeded")));
        let dispatcher =
            EnrichmentDispatcher::new(Some(provider), None, insights, EnrichmentSettings::default());

        let outcome = dispatcher.run("abc123", "https://example.com").await;
        assert!(matches!(outcome, EnrichmentOutcome::Failed(ref msg) if msg.contains("quota")));
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_without_writes() {
        let (insights, kv) = insight_cache();
        let provider = StaticProvider::new(Ok("I think this is a tech site".to_string()));
        let dispatcher =
            EnrichmentDispatcher::new(Some(provider), None, insights, EnrichmentSettings::default());

        assert_eq!(
            dispatcher.run("abc123", "https://example.com").await.state(),
            "failed"
        );
        assert!(!kv.exists("insights:abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_url_only() {
        let (insights, _) = insight_cache();
        let provider = StaticProvider::new(Ok(
            r#"{"category":"News","summary":"Headlines"}"#.to_string(),
        ));
        let dispatcher = EnrichmentDispatcher::new(
            Some(provider.clone()),
            Some(Arc::new(FailingFetcher)),
            insights,
            EnrichmentSettings::default(),
        );

        let outcome = dispatcher.run("abc123", "https://news.example").await;
        assert_eq!(outcome.state(), "completed");
        assert!(!provider.prompts.lock().unwrap()[0].contains("Page content excerpt"));
    }

    #[tokio::test]
    async fn test_fetched_context_reaches_prompt() {
        let (insights, _) = insight_cache();
        let provider = StaticProvider::new(Ok(
            r#"{"category":"Tech","summary":"Docs"}"#.to_string(),
        ));
        let dispatcher = EnrichmentDispatcher::new(
            Some(provider.clone()),
            Some(Arc::new(StaticFetcher("The Rust Programming Language"))),
            insights,
            EnrichmentSettings {
                max_context_chars: 8,
            },
        );

        dispatcher.run("abc123", "https://doc.rust-lang.org").await;
        let prompt = provider.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("The Rust"));
        assert!(!prompt.contains("Programming"));
    }

    #[tokio::test]
    async fn test_dispatch_is_background_and_tracked() {
        let (insights, _) = insight_cache();
        let provider = StaticProvider::new(Ok(
            r#"{"category":"Tech","summary":"Docs"}"#.to_string(),
        ));
        let dispatcher = EnrichmentDispatcher::new(
            Some(provider),
            None,
            insights.clone(),
            EnrichmentSettings::default(),
        );

        dispatcher.dispatch("abc123".to_string(), "https://example.com".to_string());
        assert!(dispatcher.wait_idle(Duration::from_secs(5)).await);
        assert_eq!(dispatcher.in_flight(), 0);
        assert!(insights.get_insights("abc123").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wait_idle_with_nothing_running() {
        let (insights, _) = insight_cache();
        let dispatcher = EnrichmentDispatcher::disabled(insights);
        assert!(dispatcher.wait_idle(Duration::from_millis(10)).await);
    }
}
