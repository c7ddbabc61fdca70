//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli migrate
//! ```
//!
//! Applies `crates/web/migrations/` and creates the session store table.
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use super::{CommandError, connect};

/// Run all catalog migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running catalog migrations...");
    catalog_web::db::migrate(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
