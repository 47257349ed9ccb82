/// 构建分析提示词
///
/// 页面正文按字符截断到 `max_context_chars`，保证提示词长度有上限。
pub fn build_prompt(url: &str, context: Option<&str>, max_context_chars: usize) -> String {
    let mut prompt = format!(
        "Analyze the following URL: {url}\n\
         1. Categorize it (e.g., Tech, News, Shopping, Social).\n\
         2. Provide a very short summary (max 10 words) of what this site likely is.\n"
    );

    if let Some(text) = context.map(str::trim).filter(|t| !t.is_empty())
        && max_context_chars > 0
    {
        let excerpt = truncate_chars(text, max_context_chars);
        prompt.push_str("Page content excerpt:\n\"\"\"\n");
        prompt.push_str(excerpt);
        prompt.push_str("\n\"\"\"\n");
    }

    prompt.push_str(
        "Return ONLY a JSON object like: {\"category\": \"CategoryName\", \"summary\": \"Short summary here\"}",
    );
    prompt
}

/// 按字符（而非字节）截断，避免切断 UTF-8
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt("https://example.com", None, 100);
        assert!(prompt.contains("https://example.com"));
        assert!(!prompt.contains("Page content excerpt"));
        assert!(prompt.ends_with("\"Short summary here\"}"));
    }

    #[test]
    fn test_prompt_with_context_is_bounded() {
        let context = "word ".repeat(1000);
        let prompt = build_prompt("https://example.com", Some(&context), 50);
        assert!(prompt.contains("Page content excerpt"));
        let without = build_prompt("https://example.com", None, 50);
        assert!(prompt.len() <= without.len() + 50 + 32);
    }

    #[test]
    fn test_blank_context_is_skipped() {
        let prompt = build_prompt("https://example.com", Some("   "), 50);
        assert!(!prompt.contains("Page content excerpt"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("短链接分析", 2), "短链");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
