//! Provider connectivity check
//!
//! 发送一次真实请求，验证 API key、endpoint、model 配置是否可用。

use colored::Colorize;

use crate::config::EnrichmentConfig;
use crate::interfaces::cli::CliError;
use crate::services::enrichment::{build_prompt, build_provider, parse_insight};

const SAMPLE_URL: &str = "https://www.rust-lang.org";

pub async fn check_provider(
    config: &EnrichmentConfig,
    prompt: Option<String>,
) -> Result<(), CliError> {
    let Some(provider) = build_provider(config) else {
        return Err(CliError::CommandError(
            "AI enrichment is disabled: set enrichment.api_key (or LL__ENRICHMENT__API_KEY)"
                .to_string(),
        ));
    };

    println!(
        "{} {} ({})",
        "Checking provider".yellow(),
        provider.name().cyan(),
        config.model.blue()
    );

    let custom = prompt.is_some();
    let prompt = prompt.unwrap_or_else(|| build_prompt(SAMPLE_URL, None, 0));
    let reply = provider.generate(&prompt).await?;

    println!("{} Provider replied:", "✓".bold().green());
    println!("{}", reply.trim().dimmed());

    // 默认提示词的回复应当能被解析
    if !custom {
        let insight = parse_insight(&reply)?;
        println!(
            "{} Parsed insight: {} - {}",
            "✓".bold().green(),
            insight.category.yellow(),
            insight.summary
        );
    }

    Ok(())
}
