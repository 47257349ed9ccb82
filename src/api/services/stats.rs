use actix_web::{Responder, web};
use std::sync::Arc;
use tracing::trace;

use super::helpers::{api_result, error_response};
use crate::errors::LinklensError;
use crate::services::AnalyticsService;
use crate::utils::is_valid_short_code;

pub struct StatsService;

impl StatsService {
    pub async fn get_stats(
        path: web::Path<String>,
        service: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let code = path.into_inner();
        trace!("Received stats request for {}", code);

        if !is_valid_short_code(&code) {
            return error_response(&LinklensError::not_found("URL not found"));
        }

        api_result(service.stats(&code).await.map_err(|e| match e {
            LinklensError::NotFound(_) => LinklensError::not_found("URL not found"),
            other => other,
        }))
    }
}

/// Stats 路由配置
pub fn stats_routes() -> actix_web::Resource {
    web::resource("/stats/{code}").route(web::get().to(StatsService::get_stats))
}
