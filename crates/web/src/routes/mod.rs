//! HTTP route handlers for the catalog.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (database)
//! GET  /static/style.css         - Stylesheet
//!
//! # Auth
//! GET  /register                 - Registration form
//! POST /register                 - Register action
//! GET  /login                    - Login form
//! POST /login                    - Login action
//! GET  /logout                   - Logout (requires auth)
//!
//! # Products
//! GET  /                         - Current user's products
//! GET  /products                 - Same as /
//! GET  /add_product              - Create form (requires auth)
//! POST /add_product              - Create action (requires auth)
//! GET  /edit_product/{id}        - Edit form (requires auth, owner only)
//! POST /edit_product/{id}        - Edit action (requires auth, owner only)
//! POST /delete_product/{id}      - Delete action (requires auth, owner only)
//! ```

pub mod auth;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::state::AppState;

const STYLESHEET: &str = include_str!("../../static/style.css");

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/products", get(products::index))
        .route(
            "/add_product",
            get(products::add_page).post(products::add),
        )
        .route(
            "/edit_product/{id}",
            get(products::edit_page).post(products::edit),
        )
        .route("/delete_product/{id}", post(products::delete))
}

/// Create all routes for the catalog.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/static/style.css", get(stylesheet))
        .merge(auth_routes())
        .merge(product_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}
