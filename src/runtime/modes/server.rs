//! Server mode
//!
//! Builds the runtime context, configures actix-web and waits for either the
//! server to exit or a shutdown signal.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, configure_routes};
use crate::config::get_config;
use crate::runtime::lifetime;

/// Worker 数量上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::default();
    let config = get_config();

    let startup = lifetime::startup::prepare_startup(&config)
        .await
        .inspect_err(|e| error!("Server startup failed: {:#}", e))?;

    let analytics_service = startup.analytics_service.clone();
    let dispatcher = analytics_service.dispatcher().clone();
    // worker runtime 在 stop 时销毁，分析任务必须跑在主 runtime 上
    dispatcher.bind_runtime(tokio::runtime::Handle::current());
    let grace = Duration::from_secs(config.enrichment.shutdown_grace_secs);

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(configure_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    let handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        res = server_task => {
            res.context("Server task aborted")??;
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            // 先停止接收请求，再等待已调度的分析
            handle.stop(true).await;
            lifetime::shutdown::drain_enrichment(&dispatcher, grace).await;
            info!("Graceful shutdown completed");
        }
    }

    Ok(())
}
