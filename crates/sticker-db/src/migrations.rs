//! # Database Migrations
//!
//! Schema migrations for the shop, embedded into the binary at compile
//! time from `migrations/sqlite/`. sqlx records applied migrations in its
//! own `_sqlx_migrations` table and applies the rest in filename order,
//! each inside its own transaction.
//!
//! New migrations go in as `NNN_description.sql` with the next number.
//! Applied migration files are frozen; schema changes mean a new file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the connected database up to the current schema. Safe to call on
/// every open; already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Reports `(embedded, applied)` migration counts, for diagnostics and the
/// pool smoke test.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
