//! HTTP API tests
//!
//! Create → redirect through the actix-web routes, plus the 400/404/429 paths.

use std::sync::Arc;

use actix_governor::Governor;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Condition;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};

use ephemeral_link::api::types::{ErrorBody, ShortenRequest, ShortenResponse};
use ephemeral_link::api::{configure, rate_limiter};
use ephemeral_link::config::RateLimitConfig;
use ephemeral_link::services::{Alphabet, CodeGenerator, LinkService};
use ephemeral_link::storage::{Record, Registry};
use ephemeral_link::system::ClockCache;

// =============================================================================
// Test Setup
// =============================================================================

const BODY_LIMIT: usize = 4096;

fn link_service() -> (web::Data<LinkService>, Arc<Registry>) {
    let registry = Arc::new(Registry::new());
    let clock = Arc::new(ClockCache::manual(1_700_000_000));
    let generator = Arc::new(CodeGenerator::new(
        Arc::clone(&registry),
        clock,
        Alphabet::default(),
        6,
        16,
    ));
    let service = Arc::new(LinkService::new(Arc::clone(&registry), generator));
    (web::Data::from(service), registry)
}

fn shorten_request(original: &str) -> ShortenRequest {
    ShortenRequest {
        original: original.to_string(),
    }
}

// =============================================================================
// Create
// =============================================================================

#[actix_web::test]
async fn test_shorten_success() {
    let (links, registry) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::post()
        .uri("/")
        .set_json(shorten_request("https://google.com"))
        .to_request();
    let resp: ShortenResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.shortened.len(), 6);
    assert_eq!(
        registry.get(&resp.shortened).map(|r| r.resource).as_deref(),
        Some("https://google.com")
    );
}

#[actix_web::test]
async fn test_shorten_via_get_with_body() {
    let (links, _) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::get()
        .uri("/")
        .set_json(shorten_request("https://example.com/a"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_shorten_invalid_url() {
    let (links, registry) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    for original in ["not-a-valid-url", "", "javascript:alert(1)", "ftp://example.com"] {
        let req = TestRequest::post()
            .uri("/")
            .set_json(shorten_request(original))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {original:?}");
    }
    assert!(registry.is_empty());
}

#[actix_web::test]
async fn test_shorten_bad_request_body() {
    let (links, _) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::post()
        .uri("/")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"original":"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({ "code": 1000, "message": "Invalid request body" })
    );
}

#[actix_web::test]
async fn test_shorten_body_too_large() {
    let (links, registry) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let long_url = format!("https://example.com/{}", "a".repeat(BODY_LIMIT));
    let req = TestRequest::post()
        .uri("/")
        .set_json(shorten_request(&long_url))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(registry.is_empty());
}

// =============================================================================
// Redirect
// =============================================================================

#[actix_web::test]
async fn test_redirect_success() {
    let (links, registry) = link_service();
    registry.insert_if_absent("abcdef", Record::new("https://example.com/", 1_700_000_000));
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::get().uri("/abcdef").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/"
    );

    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/abcdef")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[actix_web::test]
async fn test_redirect_round_trip() {
    let (links, _) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::post()
        .uri("/")
        .set_json(shorten_request("https://rust-lang.org/learn"))
        .to_request();
    let created: ShortenResponse = test::call_and_read_body_json(&app, req).await;

    let req = TestRequest::get()
        .uri(&format!("/{}", created.shortened))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://rust-lang.org/learn"
    );
}

#[actix_web::test]
async fn test_redirect_not_found() {
    let (links, _) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::get().uri("/123456").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 3000);
    assert!(body.message.contains("123456"));
}

#[actix_web::test]
async fn test_redirect_malformed_code() {
    let (links, _) = link_service();
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    for uri in ["/abc", "/abcdefg", "/abc.ef", "/abc%20f"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri {uri}");
    }
}

#[actix_web::test]
async fn test_codes_are_case_sensitive() {
    let (links, registry) = link_service();
    registry.insert_if_absent("AbCdEf", Record::new("https://example.com/", 1_700_000_000));
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)))
            .await;

    let req = TestRequest::get().uri("/abcdef").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Rate limiting
// =============================================================================

async fn status_of<S, R, B>(app: &S, req: R) -> StatusCode
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

#[actix_web::test]
async fn test_rate_limit_exceeded() {
    let (links, _) = link_service();
    let config = RateLimitConfig {
        enabled: true,
        burst_size: 2,
        period_secs: 60,
    };
    let app = test::init_service(
        App::new()
            .wrap(Condition::new(true, Governor::new(&rate_limiter(&config).unwrap())))
            .configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)),
    )
    .await;

    let peer = "10.0.0.1:40000".parse().unwrap();
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = TestRequest::get()
            .uri("/zzzzzz")
            .peer_addr(peer)
            .to_request();
        statuses.push(status_of(&app, req).await);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::NOT_FOUND,
            StatusCode::NOT_FOUND,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

#[actix_web::test]
async fn test_rate_limit_disabled() {
    let (links, _) = link_service();
    let config = RateLimitConfig {
        enabled: false,
        burst_size: 1,
        period_secs: 60,
    };
    let app = test::init_service(
        App::new()
            .wrap(Condition::new(config.enabled, Governor::new(&rate_limiter(&config).unwrap())))
            .configure(|cfg| configure(cfg, links.clone(), BODY_LIMIT)),
    )
    .await;

    let peer = "10.0.0.2:40000".parse().unwrap();
    for _ in 0..5 {
        let req = TestRequest::get()
            .uri("/zzzzzz")
            .peer_addr(peer)
            .to_request();
        assert_eq!(status_of(&app, req).await, StatusCode::NOT_FOUND);
    }
}
