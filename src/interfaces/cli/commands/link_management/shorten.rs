//! Shorten command

use std::time::Duration;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::runtime::lifetime::shutdown::drain_enrichment;
use crate::services::{AnalyticsService, EnrichmentOutcome};

/// 缩短 URL
///
/// `wait` 时在前台运行分析并打印终态；否则和 HTTP 一样后台调度，
/// 退出前在 `grace` 内等待它完成。
pub async fn shorten_url(
    service: &AnalyticsService,
    url: &str,
    wait: bool,
    grace: Duration,
) -> Result<(), CliError> {
    if wait {
        let result = service.shorten_without_enrichment(url).await?;
        print_shortened(&result.code, &result.original_url);
        print_outcome(
            service
                .dispatcher()
                .run(&result.code, &result.original_url)
                .await,
        );
        return Ok(());
    }

    let result = service.shorten(url).await?;
    print_shortened(&result.code, &result.original_url);

    let dispatcher = service.dispatcher();
    if !dispatcher.is_enabled() {
        return Ok(());
    }

    if !drain_enrichment(dispatcher, grace).await {
        println!(
            "{} AI analysis still running after {:?}, abandoned",
            "⚠".bold().yellow(),
            grace
        );
        return Ok(());
    }

    match service.stats(&result.code).await?.ai_insights {
        Some(insight) => println!(
            "{} AI insights: {} - {}",
            "✓".bold().green(),
            insight.category.yellow(),
            insight.summary
        ),
        None => println!(
            "{} AI analysis produced no insights, pass {} for details",
            "ℹ".bold().blue(),
            "--wait".magenta()
        ),
    }

    Ok(())
}

fn print_shortened(code: &str, original_url: &str) {
    println!(
        "{} Shortened: {} -> {}",
        "✓".bold().green(),
        code.cyan(),
        original_url.blue().underline()
    );
}

fn print_outcome(outcome: EnrichmentOutcome) {
    match outcome {
        EnrichmentOutcome::Completed(insight) => {
            println!(
                "{} AI insights: {} - {}",
                "✓".bold().green(),
                insight.category.yellow(),
                insight.summary
            );
        }
        EnrichmentOutcome::Skipped => {
            println!(
                "{} AI enrichment disabled (no API key configured)",
                "ℹ".bold().blue()
            );
        }
        EnrichmentOutcome::Failed(reason) => {
            println!("{} AI analysis failed: {}", "✗".bold().red(), reason.red());
        }
    }
}
