use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use super::helpers::json_response;
use crate::services::AnalyticsService;

/// 存储探测超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct StoreCheck {
    status: &'static str,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct EnrichmentCheck {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'static str>,
    in_flight: usize,
}

#[derive(Debug, Serialize)]
struct HealthChecks {
    store: StoreCheck,
    enrichment: EnrichmentCheck,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: HealthChecks,
    response_time_ms: u64,
}

/// Health Service
///
/// 直接探测存储后端，不经过业务逻辑。
pub struct HealthService;

impl HealthService {
    /// 在超时内 PING 存储
    async fn probe_store(service: &AnalyticsService) -> Result<(), String> {
        let backend = service.url_store().backend();
        match tokio::time::timeout(PROBE_TIMEOUT, backend.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("store error: {}", e.message())),
            Err(_) => Err(format!("timeout after {}s", PROBE_TIMEOUT.as_secs())),
        }
    }

    pub async fn health_check(
        service: web::Data<Arc<AnalyticsService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = service.url_store().backend().backend_name();
        let store = match Self::probe_store(&service).await {
            Ok(()) => StoreCheck {
                status: "healthy",
                backend,
                error: None,
            },
            Err(e) => {
                error!("Store health check failed: {}", e);
                StoreCheck {
                    status: "unhealthy",
                    backend,
                    error: Some(e),
                }
            }
        };

        let dispatcher = service.dispatcher();
        let enrichment = EnrichmentCheck {
            enabled: dispatcher.is_enabled(),
            provider: dispatcher.provider_name(),
            in_flight: dispatcher.in_flight(),
        };

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = store.status == "healthy";

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime,
            checks: HealthChecks { store, enrichment },
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            body.status,
            uptime
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status, &body)
    }

    /// 就绪检查：存储可用才算就绪
    pub async fn readiness_check(service: web::Data<Arc<AnalyticsService>>) -> impl Responder {
        trace!("Received readiness check request");

        match Self::probe_store(&service).await {
            Ok(()) => json_response(StatusCode::OK, &StatusBody { status: "ok" }),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &StatusBody {
                        status: "unavailable",
                    },
                )
            }
        }
    }

    // 活跃性检查，进程能响应即可
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::Ok().json(StatusBody { status: "ok" })
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
