//! # Database Pool Management
//!
//! Opens the SQLite database and hands out repository handles.
//!
//! ## SQLite Settings
//! - **WAL journal**: page renders read the catalog while the admin
//!   confirms orders; WAL keeps those readers and writers out of each
//!   other's way.
//! - **NORMAL synchronous**: durable enough for a shop whose source of
//!   truth is the order board, considerably faster than FULL.
//! - **Foreign keys ON**: SQLite leaves them off unless asked, and the
//!   `order_items ON DELETE CASCADE` in the schema needs them.
//!
//! One [`Database`] is built at startup and passed to whatever needs it.
//! There is no global handle; cloning is cheap because the pool inside is
//! reference-counted.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::reconciler::StockReconciler;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Settings for opening the shop database.
///
/// Built with [`DbConfig::new`] plus the builder methods, or
/// [`DbConfig::in_memory`] for tests.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Where the SQLite file lives. Created on first open.
    pub database_path: PathBuf,

    /// Pool ceiling. A handful is plenty: every page render and admin
    /// action is a short-lived unit of work.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// How long to wait for a free connection before giving up.
    pub acquire_timeout: Duration,

    /// Idle connections are closed after this long.
    pub idle_timeout: Duration,

    /// Apply pending migrations when the pool opens.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a database file at `path`, with shop defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Overrides the pool ceiling.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Overrides the idle-connection floor.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Overrides the acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Enables or disables migrations on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// An isolated in-memory database for tests.
    ///
    /// Capped at one connection: each SQLite `:memory:` connection is its
    /// own database, so a larger pool would scatter tables across
    /// disconnected instances.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Connection options with the shop's SQLite settings applied.
    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the shop database.
///
/// Everything store-facing hangs off this: the repositories via
/// [`Database::products`] / [`Database::orders`] and the checkout flow via
/// [`Database::reconciler`].
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (and if needed creates) the database described by `config`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening shop database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Called from [`Database::new`] unless the
    /// config disabled it.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for queries the repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Catalog repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Order repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Checkout validation and the order lifecycle transitions.
    pub fn reconciler(&self) -> StockReconciler {
        StockReconciler::new(self.pool.clone())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        info!("Closing shop database");
        self.pool.close().await;
    }

    /// True when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_migrates_and_answers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_builder_overrides() {
        let config = DbConfig::new("/tmp/shop_test.db")
            .max_connections(8)
            .min_connections(0)
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 0);
        assert!(!config.run_migrations);
    }
}
