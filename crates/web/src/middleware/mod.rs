//! HTTP middleware stack and request extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request span and response)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! # Extractors
//!
//! - [`RequireAuth`] / [`OptionalAuth`] - current user from the session
//! - [`DbConn`] - one pooled connection per request

pub mod auth;
pub mod db;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, set_current_user};
pub use db::DbConn;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
