//! CLI interface module

pub mod commands;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{Commands, ConfigCommands};
use crate::config::get_config;
use crate::errors::LinklensError;
use crate::runtime::lifetime::startup::prepare_startup;
use crate::services::AnalyticsService;
use commands::{check_provider, config_generate, print_code, shorten_url, show_stats};

#[derive(Debug)]
pub enum CliError {
    StoreError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StoreError(msg) => format!("Store error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StoreError(msg) => {
                format!("{} {}", "Store error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinklensError> for CliError {
    fn from(err: LinklensError) -> Self {
        match err {
            LinklensError::Store(_) | LinklensError::StoreConnection(_) => {
                CliError::StoreError(err.message().to_string())
            }
            LinklensError::Serialization(_) => CliError::ParseError(err.message().to_string()),
            _ => CliError::CommandError(err.format_simple()),
        }
    }
}

/// 打开存储并装配服务（CLI 进程内直接访问存储，不经过 HTTP）
async fn open_service() -> Result<Arc<AnalyticsService>, CliError> {
    let startup = prepare_startup(&get_config())
        .await
        .map_err(|e| CliError::StoreError(format!("{:#}", e)))?;
    Ok(startup.analytics_service)
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    let config = get_config();

    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,

        Commands::Code { url, length } => print_code(
            &url,
            length.unwrap_or(config.shortener.effective_code_length()),
        ),

        Commands::CheckProvider { prompt } => check_provider(&config.enrichment, prompt).await,

        Commands::Shorten { url, wait } => {
            let service = open_service().await?;
            let grace = Duration::from_secs(config.enrichment.shutdown_grace_secs);
            shorten_url(&service, &url, wait, grace).await
        }

        Commands::Stats { code, json } => {
            let service = open_service().await?;
            show_stats(&service, &code, json).await
        }

        Commands::Serve => Err(CliError::CommandError(
            "serve is not a one-shot command".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::EnrichmentSettings;
    use crate::storage::{KeySpace, MemoryStore};

    fn memory_service() -> Arc<AnalyticsService> {
        Arc::new(AnalyticsService::from_store(
            Arc::new(MemoryStore::new()),
            KeySpace::default(),
            6,
            None,
            None,
            EnrichmentSettings::default(),
        ))
    }

    #[tokio::test]
    async fn test_commands_accept_shared_service() {
        let service = memory_service();

        shorten_url(&service, "https://example.com", false, Duration::from_secs(1))
            .await
            .unwrap();
        show_stats(&service, "c984d0", true).await.unwrap();

        let err = show_stats(&service, "ffffff", false).await.unwrap_err();
        assert!(matches!(err, CliError::CommandError(_)));
    }

    #[test]
    fn test_store_errors_map_to_store_variant() {
        let err: CliError = LinklensError::store_connection("connection refused").into();
        assert!(matches!(err, CliError::StoreError(ref msg) if msg == "connection refused"));
    }
}
