//! 响应构建帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::LinklensError;

/// 错误响应体：`{"code", "error", "message"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub error: &'a str,
    pub message: &'a str,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, data: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(data)
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: &T) -> HttpResponse {
    json_response(StatusCode::OK, data)
}

/// 从 LinklensError 构建错误响应（自动映射 HTTP 状态码）
pub fn error_response(err: &LinklensError) -> HttpResponse {
    json_response(
        err.http_status(),
        &ErrorBody {
            code: err.code(),
            error: err.error_type(),
            message: err.message(),
        },
    )
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, LinklensError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(&data),
        Err(e) => error_response(&e),
    }
}
