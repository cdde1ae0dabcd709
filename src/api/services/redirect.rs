use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::types::{ErrorCode, error_from_link_error, error_response};
use crate::errors::LinkError;
use crate::services::LinkService;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        links: web::Data<LinkService>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !links.is_well_formed(&code) {
            // 长度或字符不合法，直接 400，不查注册表
            trace!("Malformed short code rejected: {}", code);
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::LinkInvalidCode,
                format!(
                    "Short code must be {} characters from the configured alphabet",
                    links.code_length()
                ),
            );
        }

        match links.resolve_short_link(&code) {
            Some(target) => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", target))
                .insert_header(("Cache-Control", "no-store"))
                .finish(),
            None => {
                debug!("Short link not found or expired: {}", code);
                error_from_link_error(&LinkError::not_found(format!(
                    "Short link not found: {}",
                    code
                )))
            }
        }
    }
}
