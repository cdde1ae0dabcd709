//! API 响应类型与错误码

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::LinkError;

/// API 错误码
///
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    BadRequest = 1000,
    InternalServerError = 1005,

    LinkNotFound = 3000,
    LinkInvalidUrl = 3002,
    LinkInvalidCode = 3007,
    LinkGenerationFailed = 3008,
}

impl From<&LinkError> for ErrorCode {
    fn from(err: &LinkError) -> Self {
        match err {
            LinkError::CollisionRetryExhausted(_) => ErrorCode::LinkGenerationFailed,
            LinkError::NotFound(_) => ErrorCode::LinkNotFound,
            LinkError::ClockNotStarted(_) | LinkError::Config(_) => {
                ErrorCode::InternalServerError
            }
            LinkError::InvalidInput(_) => ErrorCode::BadRequest,
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

/// 创建短链接的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub original: String,
}

/// 创建短链接的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub shortened: String,
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        code: code as i32,
        message: message.into(),
    })
}

/// 从 LinkError 构建错误响应，内部故障不向客户端暴露细节
pub fn error_from_link_error(err: &LinkError) -> HttpResponse {
    let code = ErrorCode::from(err);
    match err {
        LinkError::InvalidInput(msg) => error_response(StatusCode::BAD_REQUEST, code, msg.as_str()),
        LinkError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, code, msg.as_str()),
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            "Internal Server Error",
        ),
    }
}
