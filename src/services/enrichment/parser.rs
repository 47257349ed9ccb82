//! Provider 响应解析
//!
//! 严格解析：只接受一个 JSON 对象（可选地包在 ``` / ```json 代码块中），
//! `category` 与 `summary` 必须是非空字符串。其余一律视为失败，不做猜测。

use serde::Deserialize;

use crate::errors::{LinklensError, Result};
use crate::storage::Insight;

#[derive(Deserialize)]
struct RawInsight {
    category: String,
    summary: String,
}

/// 去掉首尾的 markdown 代码块围栏
fn strip_code_fence(text: &str) -> Result<&str> {
    let Some(rest) = text.strip_prefix("```") else {
        return Ok(text);
    };

    // 围栏行的剩余部分只允许是语言标记
    let (info, body) = rest.split_once('\n').ok_or_else(|| {
        LinklensError::enrichment("fenced response has no body")
    })?;
    let info = info.trim();
    if !info.is_empty() && !info.eq_ignore_ascii_case("json") {
        return Err(LinklensError::enrichment(format!(
            "unexpected code fence language: {}",
            info
        )));
    }

    body.trim_end()
        .strip_suffix("```")
        .ok_or_else(|| LinklensError::enrichment("unterminated code fence"))
}

/// Parse a provider reply into an [`Insight`].
pub fn parse_insight(text: &str) -> Result<Insight> {
    let body = strip_code_fence(text.trim())?.trim();

    if !body.starts_with('{') {
        return Err(LinklensError::enrichment(
            "response is not a JSON object",
        ));
    }

    let raw: RawInsight = serde_json::from_str(body)
        .map_err(|e| LinklensError::enrichment(format!("malformed insight payload: {}", e)))?;

    let category = raw.category.trim();
    let summary = raw.summary.trim();
    if category.is_empty() || summary.is_empty() {
        return Err(LinklensError::enrichment(
            "insight payload has an empty category or summary",
        ));
    }

    Ok(Insight::new(category, summary))
}
