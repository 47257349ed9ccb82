//! 生成式模型 Provider
//!
//! Provider 接收提示词并返回自由文本。任何错误都归为 `Enrichment`，
//! 由调度器统一处理，不会传播到触发它的请求。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, trace, warn};
use ureq::Agent;

use crate::config::EnrichmentConfig;
use crate::errors::{LinklensError, Result};

#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 根据配置创建 provider
///
/// 未启用或未配置 API key 时返回 `None`，此时整个分析功能处于禁用状态。
pub fn build_provider(config: &EnrichmentConfig) -> Option<Arc<dyn EnrichmentProvider>> {
    if !config.enabled {
        info!("AI enrichment disabled by configuration");
        return None;
    }

    let Some(api_key) = config.api_key() else {
        warn!("AI enrichment init skipped: no API key configured. AI features disabled.");
        return None;
    };

    let provider = GeminiProvider::new(
        &config.endpoint,
        &config.model,
        api_key,
        Duration::from_secs(config.timeout_secs),
    );
    info!("AI enrichment enabled: model {}", config.model);
    Some(Arc::new(provider))
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini `generateContent` REST provider
pub struct GeminiProvider {
    agent: Agent,
    url: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            url: format!(
                "{}/models/{}:generateContent",
                endpoint.trim_end_matches('/'),
                model
            ),
            api_key: api_key.to_string(),
        }
    }

    /// 同步 HTTP 调用，在 spawn_blocking 中执行
    fn generate_sync(agent: Agent, url: String, api_key: String, prompt: String) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let resp = agent
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .send_json(&body)
            .map_err(|e| LinklensError::enrichment(format!("provider request failed: {}", e)))?;

        let parsed: GenerateResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| LinklensError::enrichment(format!("provider response unreadable: {}", e)))?;

        extract_text(parsed)
    }
}

/// 取第一个候选的第一段文本
fn extract_text(resp: GenerateResponse) -> Result<String> {
    let text = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| LinklensError::enrichment("provider returned no text"))?;

    trace!("Provider returned {} chars", text.len());
    Ok(text)
}

#[async_trait]
impl EnrichmentProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || Self::generate_sync(agent, url, api_key, prompt))
            .await
            .map_err(|e| LinklensError::enrichment(format!("provider task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}
