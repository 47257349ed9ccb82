//! Stats command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AnalyticsService;

pub async fn show_stats(service: &AnalyticsService, code: &str, json: bool) -> Result<(), CliError> {
    let stats = service.stats(code).await?;

    if json {
        let output = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::ParseError(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    println!("{} {}", "Short code:".bold(), stats.code.cyan());
    println!(
        "{} {}",
        "Target:".bold(),
        stats.original_url.blue().underline()
    );
    println!("{} {}", "Visits:".bold(), stats.visits.to_string().green());
    match stats.ai_insights {
        Some(insight) => {
            println!("{} {}", "Category:".bold(), insight.category.yellow());
            println!("{} {}", "Summary:".bold(), insight.summary);
        }
        None => println!("{} {}", "AI insights:".bold(), "pending / unavailable".dimmed()),
    }

    Ok(())
}
