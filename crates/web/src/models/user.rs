//! User domain types.

use chrono::{DateTime, Utc};

use catalog_core::{UserId, Username};

/// A site user (domain type).
///
/// Carries no password hash; login reads it through
/// `UserRepository::get_password_hash`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
