pub mod health;
pub mod helpers;
pub mod redirect;
pub mod shorten;
pub mod stats;

pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{ErrorBody, error_response};
pub use redirect::{RedirectService, redirect_routes};
pub use shorten::{ShortenRequest, ShortenService, shorten_routes};
pub use stats::{StatsService, stats_routes};

use actix_web::web;

/// 注册全部路由；redirect 的 `/{code}` 必须放在最后
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(shorten_routes())
        .service(stats_routes())
        .service(redirect_routes());
}
