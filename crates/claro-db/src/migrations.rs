//! Database migration management.
//!
//! Provides functions to run versioned SQL migrations.

use crate::error::DbError;
use sqlx::PgPool;

/// Run all pending database migrations.
///
/// Migrations are embedded at compile time from the `migrations/` directory.
/// Each migration is run in order based on its filename prefix (0001_, 0002_, etc.).
///
/// # Errors
///
/// Returns `DbError::MigrationFailed` if any migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DbError::MigrationFailed)?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}
