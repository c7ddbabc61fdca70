//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The cookie only
//! carries the session ID, signed with the configured secret.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{Key, KeyError, SameSite, time::Duration},
    service::SignedCookie,
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CatalogConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "catalog_session";

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns `KeyError` if the session secret is too short to derive a signing
/// key (64 bytes minimum).
pub fn create_session_layer(
    pool: &PgPool,
    config: &CatalogConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, KeyError> {
    // The sessions table is created by `db::migrate`
    let store = PostgresStore::new(pool.clone());
    session_layer_with_store(store, config)
}

/// Build the session layer around any store.
///
/// # Errors
///
/// Returns `KeyError` if the session secret is shorter than 64 bytes.
pub fn session_layer_with_store<S: SessionStore + Clone>(
    store: S,
    config: &CatalogConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, KeyError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            config.session_ttl_minutes,
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
