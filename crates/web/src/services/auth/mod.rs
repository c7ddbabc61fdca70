//! Authentication service.
//!
//! Provides username/password registration and login. Passwords are hashed
//! with Argon2id and stored as PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgConnection;

use catalog_core::Username;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Authentication service.
///
/// Handles user registration and login over the request's connection.
pub struct AuthService<'c> {
    users: UserRepository<'c>,
}

impl<'c> AuthService<'c> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            users: UserRepository::new(conn),
        }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if either field is empty.
    /// Returns `AuthError::InvalidUsername` if the username is too long.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let username = Username::parse(username)?;

        // Concurrent duplicates get past this check; the unique index catches them.
        if self.users.get_by_username(&username).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password does not match.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = login_username(username).ok_or(AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Parse a submitted login name without normalizing it.
///
/// Stored usernames are already trimmed, so input that only matches after
/// trimming names no account.
fn login_username(input: &str) -> Option<Username> {
    Username::parse(input)
        .ok()
        .filter(|username| username.as_str() == input)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
