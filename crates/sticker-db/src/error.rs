//! # Database Error Types
//!
//! [`DbError`] classifies what sqlx reports into the handful of cases the
//! rest of the shop reacts to. Constraint violations are told apart via
//! [`sqlx::error::ErrorKind`]; everything else keeps its message and a
//! coarse category.
//!
//! Callers translate these into user-visible text. Nothing here is a
//! formatted user message.

use thiserror::Error;

/// Failures reported by the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE or PRIMARY KEY constraint fired, e.g. inserting an order
    /// id twice.
    #[error("Duplicate value for {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key fired: an order line pointing at a vanished product,
    /// or deleting a product that order history still references.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint fired, e.g. a write that would take
    /// `products.stock` negative.
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// The pool could not be opened or has gone away.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A migration did not apply cleanly.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The query itself failed for a reason the shop has no special
    /// handling for.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection was busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits none of the above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// A [`DbError::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DbError::UniqueViolation {
                    // SQLite reports "UNIQUE constraint failed: <table>.<column>";
                    // keep the table.column part when present
                    constraint: db_err
                        .message()
                        .rsplit(": ")
                        .next()
                        .unwrap_or("unknown")
                        .to_string(),
                },
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    DbError::CheckViolation {
                        message: db_err.message().to_string(),
                    }
                }
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
