//! # Error Types
//!
//! Domain errors for the pure core.
//!
//! Two families: [`CoreError`] for business-rule failures and
//! [`ValidationError`] for input that never should have reached the rules.
//! Both carry structured context (ids, field names, limits) so the calling
//! layer can build localized messages without parsing strings.
//!
//! Admission denials are deliberately NOT errors. A customer bumping into
//! the specials gate is an expected outcome, modelled by
//! [`crate::admission::Decision`] and never logged as a failure.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No such product in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No such order.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order's current status does not allow the requested
    /// transition, e.g. confirming anything but a pending order.
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
    },

    /// Checkout with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A custom tier table broke the construction rules (ordering,
    /// monotonicity, or a discount past 100%).
    #[error("Invalid discount table: {reason}")]
    InvalidDiscountTable { reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input, caught at the boundary before any rule or store call
/// runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Missing or blank required field.
    #[error("{field} is required")]
    Required { field: String },

    /// Text field over its length cap.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Number outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Number that must be strictly positive was not.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Malformed value: bad UUID, unusable phone number.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
