//! # Admission Module
//!
//! Decides whether a cart mutation is allowed, before it happens.
//!
//! ## Rule Order
//! Rules are evaluated in a fixed order so the first failing rule
//! determines the denial reason the customer sees:
//!
//! 1. Stock ceiling: in-cart quantity + requested must not exceed the
//!    product's known stock.
//! 2. Special gate (special-collection items only):
//!    a. the cart must already hold at least
//!       [`MIN_REGULAR_FOR_SPECIAL`](crate::MIN_REGULAR_FOR_SPECIAL)
//!       regular items;
//!    b. specials are capped at
//!       [`MAX_SPECIAL_PER_ORDER`](crate::MAX_SPECIAL_PER_ORDER) per cart.
//!
//! The policy is a pure decision function with no side effects: the caller
//! applies the mutation only on `Allowed` and surfaces the structured
//! denial reason otherwise. Quantity updates and removals re-run
//! [`check_cart`] against the resulting state, because shrinking the
//! regular count below the threshold while specials remain is also a state
//! the policy polices (resolved by
//! [`Cart::evict_ineligible_specials`](crate::cart::Cart::evict_ineligible_specials)).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::types::Product;
use crate::{MAX_SPECIAL_PER_ORDER, MIN_REGULAR_FOR_SPECIAL};

// =============================================================================
// Decision
// =============================================================================

/// Why an addition or cart state was denied.
///
/// Structured reasons only; the storefront turns these into localized
/// user-facing messages. Denials are expected outcomes, not system errors,
/// and are never logged as such.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum DenialReason {
    /// The request would push the product's cart quantity above its stock.
    InsufficientStock {
        product_id: String,
        name: String,
        in_cart: i64,
        requested: i64,
        available: i64,
    },
    /// Special items require a minimum count of regular items in the cart.
    SpecialRequiresRegularMinimum { required: i64, present: i64 },
    /// The per-order cap on special items would be exceeded.
    SpecialLimitExceeded {
        limit: i64,
        in_cart: i64,
        requested: i64,
    },
}

/// The outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Allowed,
    Denied { reason: DenialReason },
}

impl Decision {
    /// Shorthand for building a denial.
    fn denied(reason: DenialReason) -> Self {
        Decision::Denied { reason }
    }

    /// Whether the mutation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Decides whether `requested_quantity` units of `product` may be added to
/// (or merged into) the cart.
///
/// ## Example
/// ```rust
/// use sticker_core::admission::{can_add, Decision};
/// use sticker_core::cart::Cart;
/// # use sticker_core::types::Product;
/// # use chrono::Utc;
/// # let sticker = Product { id: "p".into(), name: "p".into(), price_cents: 1000,
/// #     stock: 5, collection: "retro".into(), image_url: None, created_at: Utc::now() };
///
/// let cart = Cart::new();
/// assert!(can_add(&cart, &sticker, 5).is_allowed());
/// assert!(!can_add(&cart, &sticker, 6).is_allowed());
/// ```
pub fn can_add(cart: &Cart, product: &Product, requested_quantity: i64) -> Decision {
    let in_cart = cart.quantity_of(&product.id);

    // Rule 1: stock ceiling, against the product snapshot's stock.
    // Live stock is re-checked at checkout by the reconciler.
    if in_cart + requested_quantity > product.stock {
        return Decision::denied(DenialReason::InsufficientStock {
            product_id: product.id.clone(),
            name: product.name.clone(),
            in_cart,
            requested: requested_quantity,
            available: product.stock,
        });
    }

    // Rule 2: special gate
    if product.is_special() {
        let regular = cart.regular_quantity();
        if regular < MIN_REGULAR_FOR_SPECIAL {
            return Decision::denied(DenialReason::SpecialRequiresRegularMinimum {
                required: MIN_REGULAR_FOR_SPECIAL,
                present: regular,
            });
        }

        let special = cart.special_quantity();
        if special + requested_quantity > MAX_SPECIAL_PER_ORDER {
            return Decision::denied(DenialReason::SpecialLimitExceeded {
                limit: MAX_SPECIAL_PER_ORDER,
                in_cart: special,
                requested: requested_quantity,
            });
        }
    }

    Decision::Allowed
}

/// Re-validates a whole cart state against the special-item rules.
///
/// Run after quantity updates and removals, not only additions: a cart
/// whose regular count dropped below the threshold while specials remain,
/// or that accumulated more specials than the cap, is denied. Per-product
/// stock is checked at add time and again against live stock at checkout,
/// so it is not re-examined here.
pub fn check_cart(cart: &Cart) -> Decision {
    let special = cart.special_quantity();
    if special == 0 {
        return Decision::Allowed;
    }

    let regular = cart.regular_quantity();
    if regular < MIN_REGULAR_FOR_SPECIAL {
        return Decision::denied(DenialReason::SpecialRequiresRegularMinimum {
            required: MIN_REGULAR_FOR_SPECIAL,
            present: regular,
        });
    }

    if special > MAX_SPECIAL_PER_ORDER {
        return Decision::denied(DenialReason::SpecialLimitExceeded {
            limit: MAX_SPECIAL_PER_ORDER,
            in_cart: special,
            requested: 0,
        });
    }

    Decision::Allowed
}

// =============================================================================
// Unit Tests
// =============================================================================
