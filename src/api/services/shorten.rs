use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, Responder, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, trace};

use super::helpers::{api_result, error_response};
use crate::errors::LinklensError;
use crate::services::AnalyticsService;

/// 请求体上限
const MAX_SHORTEN_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: Option<String>,
}

pub struct ShortenService;

impl ShortenService {
    pub async fn shorten(
        body: web::Json<ShortenRequest>,
        service: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let url = body.into_inner().url.unwrap_or_default();
        trace!("Received shorten request for {:?}", url);
        api_result(service.shorten(&url).await)
    }
}

/// JSON 解析失败也返回统一的错误体（400）
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_SHORTEN_BODY_BYTES)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            debug!("Rejected shorten body: {}", err);
            let response = error_response(&LinklensError::validation(format!(
                "Invalid request body: {}",
                err
            )));
            InternalError::from_response(err, response).into()
        })
}

/// Shorten 路由配置
pub fn shorten_routes() -> actix_web::Resource {
    web::resource("/shorten")
        .app_data(json_config())
        .route(web::post().to(ShortenService::shorten))
}
