//! 页面正文抓取
//!
//! 为提示词提供上下文。抓取失败只会降低分析质量，调度器会退化为仅按 URL 分析。
//! 内置 Moka 缓存 + Singleflight 语义，同一 URL 的并发抓取只发一次请求。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::prompt::truncate_chars;
use crate::config::EnrichmentConfig;
use crate::errors::{LinklensError, Result};

/// 抓取结果缓存 TTL（15 分钟）
const FETCH_CACHE_TTL_SECS: u64 = 15 * 60;
/// 抓取结果缓存最大容量
const FETCH_CACHE_MAX_CAPACITY: u64 = 1_000;
/// 响应体读取上限
const MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;
/// 缓存的正文长度上限（字符）
const MAX_TEXT_CHARS: usize = 20_000;

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// 返回页面的纯文本
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// 根据配置创建 fetcher，未启用时返回 `None`
pub fn build_fetcher(config: &EnrichmentConfig) -> Option<Arc<dyn ContentFetcher>> {
    if !config.fetch_context {
        return None;
    }
    Some(Arc::new(HttpContentFetcher::new(Duration::from_secs(
        config.fetch_timeout_secs,
    ))))
}

pub struct HttpContentFetcher {
    agent: Agent,
    /// URL → 正文（None 用于负缓存）
    cache: Cache<String, Option<String>>,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(FETCH_CACHE_TTL_SECS))
            .max_capacity(FETCH_CACHE_MAX_CAPACITY)
            .build();

        Self { agent, cache }
    }

    /// 同步抓取（在 spawn_blocking 中调用）
    fn fetch_sync(agent: Agent, url: String) -> Option<String> {
        let resp = match agent.get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("Content fetch of \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let is_text = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.starts_with("text/") || ct.contains("html"));
        if !is_text {
            trace!("Skipping non-text content at {}", url);
            return None;
        }

        let html = match resp
            .into_body()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
        {
            Ok(body) => body,
            Err(e) => {
                warn!("Content body of \"{}\" unreadable: {}", url, e);
                return None;
            }
        };

        let text = html_to_text(&html);
        if text.is_empty() {
            return None;
        }
        Some(truncate_chars(&text, MAX_TEXT_CHARS).to_string())
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        // get_with 自带 singleflight 语义
        let cached = self
            .cache
            .get_with(url.to_string(), async {
                trace!("Content cache miss for {}, fetching", url);
                let agent = self.agent.clone();
                let owned = url.to_string();
                tokio::task::spawn_blocking(move || Self::fetch_sync(agent, owned))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Content fetch spawn_blocking failed: {}", e);
                        None
                    })
            })
            .await;

        cached.ok_or_else(|| LinklensError::enrichment(format!("no content fetched for {}", url)))
    }
}

/// 粗略提取 HTML 可见文本：去掉 script/style、标签，解码常见实体，合并空白
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let lower = html.to_ascii_lowercase();
    let mut i = 0;

    while i < html.len() {
        let rest = &lower[i..];
        if rest.starts_with("<script") || rest.starts_with("<style") {
            let close = if rest.starts_with("<script") {
                "</script>"
            } else {
                "</style>"
            };
            i = match rest.find(close) {
                Some(end) => i + end + close.len(),
                None => html.len(),
            };
            out.push(' ');
            continue;
        }
        if rest.starts_with('<') {
            i = match rest.find('>') {
                Some(end) => i + end + 1,
                None => html.len(),
            };
            out.push(' ');
            continue;
        }
        if rest.starts_with('&')
            && let Some((decoded, len)) = decode_entity(&html[i..])
        {
            out.push(decoded);
            i += len;
            continue;
        }

        // to_ascii_lowercase 不改变字节长度，索引两边通用
        let ch = html[i..].chars().next().unwrap_or(' ');
        out.push(ch);
        i += ch.len_utf8();
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(s: &str) -> Option<(char, usize)> {
    const ENTITIES: [(&str, char); 7] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
        ("&nbsp;", ' '),
    ];
    ENTITIES
        .iter()
        .find(|(name, _)| s.starts_with(name))
        .map(|(name, ch)| (*ch, name.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup() {
        let html = r#"<html><head><title>Rust</title><style>body { color: red; }</style>
            <script type="text/javascript">var x = "<b>";</script></head>
            <body><h1>Rust &amp; Cargo</h1><p>Fast,   reliable&nbsp;software.</p></body></html>"#;
        assert_eq!(html_to_text(html), "Rust Rust & Cargo Fast, reliable software.");
    }

    #[test]
    fn test_html_to_text_handles_uppercase_and_unicode() {
        let html = "<SCRIPT>alert(1)</SCRIPT><P>短链接 — café</P>";
        assert_eq!(html_to_text(html), "短链接 — café");
    }

    #[test]
    fn test_html_to_text_unterminated_tag() {
        assert_eq!(html_to_text("hello <b"), "hello");
        assert_eq!(html_to_text("a &unknown; b"), "a &unknown; b");
    }

    #[test]
    fn test_build_fetcher_respects_flag() {
        let mut config = EnrichmentConfig::default();
        assert!(build_fetcher(&config).is_some());
        config.fetch_context = false;
        assert!(build_fetcher(&config).is_none());
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[tokio::test]
    #[ignore]
    async fn test_fetch_unroutable_address_fails() {
        let fetcher = HttpContentFetcher::new(Duration::from_secs(1));
        assert!(fetcher.fetch_text("http://192.0.2.1/").await.is_err());
        // 负缓存：第二次直接命中缓存
        assert!(fetcher.fetch_text("http://192.0.2.1/").await.is_err());
    }
}
