//! Database migration commands.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the
//! CLI at compile time, so a deployed binary needs no source checkout.
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL`
//!   connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

/// List applied migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the query fails.
pub async fn status() -> Result<(), CommandError> {
    let url = database_url()?;
    let pool = PgPool::connect(url.expose_secret()).await?;

    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT version, description FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        tracing::info!("No migrations applied yet");
        return Ok(());
    }

    for (version, description) in rows {
        tracing::info!(version, description = %description, "applied");
    }

    Ok(())
}
