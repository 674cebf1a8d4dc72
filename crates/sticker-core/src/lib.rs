//! # sticker-core: Pure Business Logic for the Sticker Shop
//!
//! This crate is the **heart** of the shop. It contains the pricing and
//! cart-admission rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Sticker Shop Architecture                       │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront (server-rendered pages)             │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Admin orders           │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │              ★ sticker-core (THIS CRATE) ★                  │   │
//! │  │                                                             │   │
//! │  │  ┌────────┐ ┌────────┐ ┌─────────┐ ┌───────────┐           │   │
//! │  │  │ money  │ │ pricing│ │admission│ │ validation│           │   │
//! │  │  │ Money  │ │ tiers  │ │ gates   │ │ rules     │           │   │
//! │  │  └────────┘ └────────┘ └─────────┘ └───────────┘           │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                sticker-db (Database Layer)                  │   │
//! │  │     SQLite repositories, migrations, stock reconciliation   │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Order, OrderLine and the status/payment enums
//! - [`money`] - integer-agorot amounts and the two rounding rules
//! - [`cart`] - the cart value type the rules operate on
//! - [`pricing`] - the tiered quantity-discount engine
//! - [`admission`] - cart admission policy (stock ceiling, special gates)
//! - [`validation`] - boundary checks
//! - [`error`] - domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: a cart snapshot in, a breakdown or decision out,
//!    deterministically
//! 2. **No I/O**: nothing in this crate talks to a database or the network
//! 3. **Integer money**: prices and totals are agorot (i64), never floats
//! 4. **Structured outcomes**: denials and errors are typed values, not
//!    message strings
//!
//! ## Example Usage
//!
//! ```rust
//! use sticker_core::cart::Cart;
//! use sticker_core::pricing::{compute_discount, DiscountTable};
//! # use sticker_core::types::Product;
//! # use chrono::Utc;
//! # let sticker = Product { id: "p".into(), name: "p".into(), price_cents: 1000,
//! #     stock: 99, collection: "retro".into(), image_url: None, created_at: Utc::now() };
//!
//! let mut cart = Cart::new();
//! cart.add_line(&sticker, 8);
//!
//! // 8 regular stickers at ₪10 land in the 10% tier: ceil(80 × 0.9) = ₪72
//! let breakdown = compute_discount(&cart, &DiscountTable::default());
//! assert_eq!(breakdown.final_total.cents(), 7200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admission;
pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sticker_core::Money` instead of
// `use sticker_core::money::Money`

pub use admission::{can_add, check_cart, Decision, DenialReason};
pub use cart::{Cart, CartLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{
    checkout_total, compute_discount, discounted_unit_price, DiscountBreakdown, DiscountTable,
    DiscountTier,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// The collection tag that marks special items.
///
/// The storefront historically carried several divergent literals for the
/// specials collection. This constant is the only one left: every rule in
/// this crate compares against it, and the catalog stores the same string.
pub const SPECIAL_COLLECTION: &str = "specials";

/// Minimum regular items a cart must hold before any special item may be
/// added (and for special items already in the cart to remain).
pub const MIN_REGULAR_FOR_SPECIAL: i64 = 10;

/// Maximum special items per order.
pub const MAX_SPECIAL_PER_ORDER: i64 = 3;

/// Cap on the quantity of a single cart line. Catches a customer typing
/// 1000 where they meant 10 long before stock checks would.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Flat Israel Post delivery fee, in agorot (₪15).
pub const DELIVERY_FEE_CENTS: i64 = 1500;

// =============================================================================
// Shared Test Fixtures
// =============================================================================
