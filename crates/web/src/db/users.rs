//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use catalog_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
///
/// Borrows the request's connection for its whole lifetime.
pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &mut self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, created_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user together with their stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &mut self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, username, created_at, password_hash
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Count users with the given username (0 or 1, given the unique index).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_username(&mut self, username: &Username) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_create_and_lookup(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = UserRepository::new(&mut conn);

        let created = users.create(&name("alice"), "hash").await.unwrap();
        assert_eq!(created.username.as_str(), "alice");

        let by_name = users.get_by_username(&name("alice")).await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        let (user, hash) = users.get_password_hash(&name("alice")).await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(hash, "hash");
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_duplicate_username_conflicts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = UserRepository::new(&mut conn);

        users.create(&name("bob"), "first").await.unwrap();
        let err = users.create(&name("bob"), "second").await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(users.count_by_username(&name("bob")).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_missing_user_is_none(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = UserRepository::new(&mut conn);

        assert!(users.get_by_username(&name("nobody")).await.unwrap().is_none());
        assert!(users.get_password_hash(&name("nobody")).await.unwrap().is_none());
    }
}
