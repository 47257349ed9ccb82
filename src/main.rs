use clap::Parser;
use tracing::error;

use linklens::cli::Cli;
use linklens::config::{get_config, init_config};
use linklens::system::init_logging;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());
    let config = get_config();

    if cli.is_server_mode() {
        let _guard = match init_logging(&config.logging) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Failed to initialize logging: {:#}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = linklens::runtime::modes::run_server().await {
            error!("Server exited with error: {:#}", e);
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
        return;
    }

    #[cfg(feature = "cli")]
    if let Some(command) = cli.command {
        // CLI 模式只输出 warn 以上的日志，避免干扰命令输出
        let mut logging = config.logging.clone();
        logging.level = "warn".to_string();
        let _guard = init_logging(&logging).ok();

        if let Err(e) = linklens::runtime::modes::run_cli(command).await {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    }
}
