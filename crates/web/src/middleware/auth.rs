//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::flash::{self, FlashMessage};
use crate::models::{CurrentUser, session_keys};

/// Where anonymous users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Message queued when an anonymous user hits a protected page.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, queues a flash message and redirects to the login
/// page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is not installed on this route.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSession => {
                tracing::error!("Session extension missing; is the session layer installed?");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        if let Some(user) = current_user(session).await {
            return Ok(Self(user));
        }

        if let Err(e) = flash::push(session, FlashMessage::info(LOGIN_REQUIRED_MESSAGE)).await {
            tracing::warn!(error = %e, "Failed to queue login-required message");
        }

        Err(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Read the current user, treating session errors as "not logged in".
async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read current user from session"))
        .ok()
        .flatten()
}

/// Record `user` as logged in.
///
/// Rotates the session ID first so an ID issued before login is useless
/// afterwards.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}
