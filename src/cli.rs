//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Linklens - deterministic URL shortener with AI link insights
#[derive(Parser)]
#[command(name = "linklens")]
#[command(version)]
#[command(about = "Deterministic URL shortener with visit analytics and AI link insights", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Shorten a URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Run AI enrichment in the foreground and print its outcome
        #[arg(long)]
        wait: bool,
    },

    /// Show visits and AI insights for a short code
    Stats {
        /// Short code
        code: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the short code for a URL without storing anything
    Code {
        /// URL to hash
        url: String,

        /// Code length (default: shortener.code_length)
        #[arg(long, short = 'l')]
        length: Option<usize>,
    },

    /// Send a test prompt to the configured AI provider
    CheckProvider {
        /// Custom prompt (default: analyze a sample URL)
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 无子命令时默认启动服务器
    pub fn is_server_mode(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }
}
