use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

use crate::services::EnrichmentDispatcher;

/// 等待 Ctrl+C
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 在宽限期内等待后台分析任务，返回是否全部完成
///
/// 超时后未完成的任务直接丢弃，不会写入结果。
pub async fn drain_enrichment(dispatcher: &EnrichmentDispatcher, grace: Duration) -> bool {
    let pending = dispatcher.in_flight();
    if pending == 0 {
        return true;
    }

    info!("Waiting up to {:?} for {} enrichment task(s)", grace, pending);
    let drained = dispatcher.wait_idle(grace).await;
    if drained {
        info!("All enrichment tasks completed");
    } else {
        warn!(
            "Enrichment drain timed out, abandoning {} task(s)",
            dispatcher.in_flight()
        );
    }
    drained
}
