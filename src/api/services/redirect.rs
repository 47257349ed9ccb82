use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::sync::Arc;
use tracing::{debug, error, trace};

use super::helpers::error_response;
use crate::errors::LinklensError;
use crate::services::AnalyticsService;
use crate::utils::is_valid_short_code;

/// Location 头中需要转义的字符
///
/// 保留 URL 结构字符（`:/%#?=@[]!$&'()*+,;`）和 unreserved，其余 ASCII 可见字符、
/// 控制字符与非 ASCII 字节都做百分号编码。已编码的 `%XX` 原样保留。
const LOCATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// 把存储的原始 URL 转成合法的 Location 头值
pub fn encode_location(url: &str) -> String {
    utf8_percent_encode(url, LOCATION_ENCODE_SET).to_string()
}

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let code = path.into_inner();

        // 非法短码直接 404，不访问存储
        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected: {}", code);
            return error_response(&LinklensError::not_found("URL not found"));
        }

        // HEAD 多为链接预览/探测，不计入访问数
        let target = if *req.method() == Method::HEAD {
            service.resolve_target(&code).await
        } else {
            service.redirect_target(&code).await
        };

        match target {
            Ok(url) => {
                debug!("Redirecting {} -> {}", code, url);
                HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
                    .insert_header(("Location", encode_location(&url)))
                    .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
                    .finish()
            }
            Err(LinklensError::NotFound(_)) => {
                debug!("Redirect link not found: {}", code);
                error_response(&LinklensError::not_found("URL not found"))
            }
            Err(e) => {
                error!("Store error during redirect lookup: {}", e);
                error_response(&e)
            }
        }
    }
}

/// Redirect 路由配置，必须最后注册
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url_is_unchanged() {
        let url = "https://example.com/a/b?q=1&x=y#frag";
        assert_eq!(encode_location(url), url);
        assert_eq!(
            encode_location("https://user@host/p;a=1,(x)*+!$'[]"),
            "https://user@host/p;a=1,(x)*+!$'[]"
        );
    }

    #[test]
    fn test_existing_escapes_are_kept() {
        assert_eq!(
            encode_location("https://example.com/a%20b"),
            "https://example.com/a%20b"
        );
    }

    #[test]
    fn test_control_and_unsafe_chars_are_encoded() {
        assert_eq!(
            encode_location("https://example.com/a\nb c"),
            "https://example.com/a%0Ab%20c"
        );
        assert_eq!(
            encode_location("https://example.com/{x}|\"<>^`\\"),
            "https://example.com/%7Bx%7D%7C%22%3C%3E%5E%60%5C"
        );
    }

    #[test]
    fn test_non_ascii_is_utf8_encoded() {
        assert_eq!(
            encode_location("https://example.com/短链"),
            "https://example.com/%E7%9F%AD%E9%93%BE"
        );
    }
}
