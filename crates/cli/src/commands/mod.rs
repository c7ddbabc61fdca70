//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] catalog_web::db::MigrationError),

    /// User could not be created.
    #[error("{0}")]
    Auth(#[from] catalog_web::services::auth::AuthError),
}

/// Connect using `CATALOG_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CATALOG_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("CATALOG_DATABASE_URL"))?;

    tracing::info!("Connecting to catalog database...");
    let pool = catalog_web::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
