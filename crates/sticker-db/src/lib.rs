//! # sticker-db: Database Layer for the Sticker Shop
//!
//! This crate provides database access for the sticker shop.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Sticker Shop Data Flow                         │
//! │                                                                     │
//! │  Storefront / admin action                                          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  sticker-db (THIS CRATE)                    │   │
//! │  │                                                             │   │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌────────────────────┐  │   │
//! │  │  │  Database  │  │ Repositories │  │  StockReconciler   │  │   │
//! │  │  │ (pool.rs)  │◄─│ products     │  │ validate / submit  │  │   │
//! │  │  │ SqlitePool │  │ orders       │  │ confirm / reject   │  │   │
//! │  │  └────────────┘  └──────────────┘  └────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite Database (WAL mode, embedded migrations)                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - opening the database, SQLite settings, repository handles
//! - [`migrations`] - embedded schema migrations
//! - [`error`] - the [`DbError`] taxonomy
//! - [`repository`] - SQL for products and orders
//! - [`reconciler`] - stock validation and the order lifecycle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sticker_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shop.db")).await?;
//!
//! let catalog = db.products().list().await?;
//! let order = db.reconciler().submit_order(&details, &cart, &table).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconciler;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use reconciler::{
    ConfirmError, StockReconciler, StockShortfall, SubmitError, TransitionError,
};

// Repository re-exports for convenience
pub use repository::order::{OrderRepository, OrderWithLines};
pub use repository::product::ProductRepository;

// =============================================================================
// Shared Test Fixtures
// =============================================================================
