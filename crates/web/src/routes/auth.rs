//! Authentication route handlers.
//!
//! Handles registration, login and logout with username/password credentials
//! checked against the local user table.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::flash::{self, FlashMessage};
use crate::middleware::{DbConn, OptionalAuth, RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};

pub const REGISTERED_MESSAGE: &str = "Registration successful! Please log in.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed! Check your username and password.";

// =============================================================================
// Form Types
// =============================================================================

/// Credentials submitted by the login and registration forms.
///
/// Missing fields deserialize as empty strings so the service can report them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub messages: Vec<FlashMessage>,
    pub current_user: Option<CurrentUser>,
    pub username: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub messages: Vec<FlashMessage>,
    pub current_user: Option<CurrentUser>,
    pub username: String,
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
) -> RegisterTemplate {
    RegisterTemplate {
        messages: flash::take(&session).await,
        current_user,
        username: String::new(),
    }
}

/// Handle registration form submission.
///
/// Rejected input re-renders the form with the reason; nothing is stored.
pub async fn register(
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
    mut conn: DbConn,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    let result = AuthService::new(&mut conn)
        .register(&form.username, &form.password)
        .await;

    let reason = match result {
        Ok(_) => {
            flash::push(&session, FlashMessage::success(REGISTERED_MESSAGE)).await?;
            return Ok(Redirect::to("/login").into_response());
        }
        Err(AuthError::UserAlreadyExists) => "Username already exists.".to_owned(),
        Err(AuthError::MissingField(field)) => format!("The {field} field is required."),
        Err(AuthError::InvalidUsername(e)) => format!("Invalid username: {e}."),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(username = %form.username, reason = %reason, "Registration rejected");

    let mut messages = flash::take(&session).await;
    messages.push(FlashMessage::danger(reason));

    Ok(RegisterTemplate {
        messages,
        current_user,
        username: form.username,
    }
    .into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
) -> LoginTemplate {
    LoginTemplate {
        messages: flash::take(&session).await,
        current_user,
        username: String::new(),
    }
}

/// Handle login form submission.
///
/// Unknown usernames and wrong passwords get the same response.
pub async fn login(
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
    mut conn: DbConn,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    match AuthService::new(&mut conn)
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&user.id, user.username.as_str());

            tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!(username = %form.username, "Login failed");

            let mut messages = flash::take(&session).await;
            messages.push(FlashMessage::danger(LOGIN_FAILED_MESSAGE));

            Ok(LoginTemplate {
                messages,
                current_user,
                username: form.username,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Log out and return to the listing.
///
/// Deletes the whole session record, flashes included.
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Redirect> {
    session.flush().await?;
    clear_sentry_user();

    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Redirect::to("/"))
}
