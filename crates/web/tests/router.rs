//! Router tests for pages that never reach the database.
//!
//! The pool connects lazily to an address nothing listens on, and sessions
//! live in memory.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use catalog_web::config::{CatalogConfig, LogFormat};
use catalog_web::middleware::request_id::REQUEST_ID_HEADER;
use catalog_web::middleware::session::{SESSION_COOKIE_NAME, session_layer_with_store};
use catalog_web::state::AppState;

const UNREACHABLE_DATABASE: &str = "postgres://catalog@127.0.0.1:1/catalog";

fn test_config() -> CatalogConfig {
    CatalogConfig {
        database_url: SecretString::from(UNREACHABLE_DATABASE),
        host: "127.0.0.1".parse().unwrap(),
        port: 5000,
        base_url: "http://localhost:5000".to_string(),
        session_secret: SecretString::from("k7Qz2vL9pX4mW8nR3tY6bF1hJ5dS0gA".repeat(3)),
        session_ttl_minutes: 60,
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn test_app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy(UNREACHABLE_DATABASE)
        .unwrap();
    let session_layer = session_layer_with_store(MemoryStore::default(), &config).unwrap();

    catalog_web::app(AppState::new(pool), session_layer)
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the session cookie, if the response set one.
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

#[tokio::test]
async fn test_health() {
    let response = get(&test_app(), "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_fails_without_database() {
    let response = get(&test_app(), "/health/ready", None).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_anonymous_index_is_empty_listing() {
    let app = test_app();

    for uri in ["/", "/products"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Products"));
        assert!(body.contains("href=\"/login\""));
        assert!(!body.contains("<table"));
    }
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let response = get(&test_app(), "/login", None).await;
    let headers = response.headers();

    assert!(headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
}

#[tokio::test]
async fn test_login_and_register_pages_render_forms() {
    let app = test_app();

    let body = body_text(get(&app, "/login", None).await).await;
    assert!(body.contains("action=\"/login\""));
    assert!(body.contains("name=\"username\""));
    assert!(body.contains("name=\"password\""));

    let body = body_text(get(&app, "/register", None).await).await;
    assert!(body.contains("action=\"/register\""));
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = test_app();

    for uri in ["/add_product", "/edit_product/1", "/logout"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete_product/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_login_required_notice_is_shown_once() {
    let app = test_app();

    let redirect = get(&app, "/add_product", None).await;
    let cookie = session_cookie(&redirect).unwrap();

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(body.contains("Please log in to access this page."));
    assert!(body.contains("flash-info"));

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(!body.contains("Please log in to access this page."));
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let redirect = get(&test_app(), "/add_product", None).await;
    let set_cookie = redirect
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();

    assert!(set_cookie.starts_with(SESSION_COOKIE_NAME));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_stylesheet() {
    let response = get(&test_app(), "/static/style.css", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
}
