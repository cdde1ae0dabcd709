pub mod redirect;
pub mod shorten;

pub use redirect::RedirectService;
pub use shorten::ShortenService;

/// 短链接路由：`/` 创建，`/{code}` 跳转
pub fn link_routes() -> actix_web::Scope {
    use actix_web::web;

    web::scope("")
        .route("/", web::post().to(ShortenService::handle_shorten))
        .route("/", web::get().to(ShortenService::handle_shorten))
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
