//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! CATALOG_NEW_USER_PASSWORD='...' catalog-cli user create -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `CATALOG_NEW_USER_PASSWORD` - password for the new user

use catalog_web::services::auth::AuthService;

use super::{CommandError, connect};

/// Create a user the same way the registration form does.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the username is invalid or taken, or the database is
/// unreachable.
pub async fn create(username: &str, password: &str) -> Result<i32, CommandError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    let user = AuthService::new(&mut conn)
        .register(username, password)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );

    Ok(user.id.as_i32())
}
