use serde::{Deserialize, Serialize};

/// code → 原始 URL 映射，shorten 的返回值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    #[serde(rename = "short_code")]
    pub code: String,
    pub original_url: String,
}

/// 访问计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitStats {
    pub visits: u64,
}

/// AI 分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub summary: String,
}

impl Insight {
    pub const CATEGORY_FIELD: &'static str = "category";
    pub const SUMMARY_FIELD: &'static str = "summary";

    pub fn new(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            summary: summary.into(),
        }
    }
}
