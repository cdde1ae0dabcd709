use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::types::{
    ErrorCode, ShortenRequest, ShortenResponse, error_from_link_error, error_response,
};
use crate::services::LinkService;
use crate::utils::validate_url;

pub struct ShortenService;

impl ShortenService {
    /// 为请求体中的 `original` 生成短码
    pub async fn handle_shorten(
        body: web::Json<ShortenRequest>,
        links: web::Data<LinkService>,
    ) -> impl Responder {
        let original = body.into_inner().original;
        let original = original.trim();
        trace!("Received shorten request for: {}", original);

        if let Err(e) = validate_url(original) {
            debug!("Rejected invalid URL '{}': {}", original, e);
            return error_response(StatusCode::BAD_REQUEST, ErrorCode::LinkInvalidUrl, e.to_string());
        }

        match links.create_short_link(original) {
            Ok(code) => HttpResponse::Ok().json(ShortenResponse { shortened: code }),
            Err(e) => error_from_link_error(&e),
        }
    }
}
