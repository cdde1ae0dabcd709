//! HTTP 接口层
//!
//! 只做请求解析、URL 校验与响应映射，业务全部交给 `LinkService`。

pub mod rate_limit;
pub mod services;
pub mod types;

use actix_web::http::StatusCode;
use actix_web::{error::InternalError, web};
use tracing::debug;

use crate::services::LinkService;
use types::{ErrorCode, error_response};

pub use rate_limit::{RateLimiterConfig, rate_limiter};
pub use services::link_routes;

/// 注册共享状态、JSON 解析配置和短链接路由
///
/// 请求体超过 `body_limit` 字节或不是合法 JSON 时返回 400。
pub fn configure(cfg: &mut web::ServiceConfig, links: web::Data<LinkService>, body_limit: usize) {
    let json_config = web::JsonConfig::default()
        .limit(body_limit)
        .error_handler(|err, _req| {
            debug!("Rejected request body: {}", err);
            let response = error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "Invalid request body",
            );
            InternalError::from_response(err, response).into()
        });

    cfg.app_data(links)
        .app_data(json_config)
        .service(link_routes());
}
