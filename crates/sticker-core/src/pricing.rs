//! # Pricing Module
//!
//! The quantity-discount engine: one canonical tier table, applied to the
//! regular portion of a cart, with special items always at full price.
//!
//! ## Discount Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     compute_discount(cart)                          │
//! │                                                                     │
//! │  Cart lines ──► partition by collection                             │
//! │                    │                                                │
//! │         ┌──────────┴───────────┐                                    │
//! │         ▼                      ▼                                    │
//! │   regular lines          special lines                              │
//! │   Σ qty, Σ price         Σ qty, Σ price (never discounted)          │
//! │         │                      │                                    │
//! │         ▼                      │                                    │
//! │   tier lookup by regular qty   │                                    │
//! │   (highest threshold first)    │                                    │
//! │         │                      │                                    │
//! │         ▼                      ▼                                    │
//! │   final_total = ceil(regular − discount + special) to whole shekel  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tier table is injected configuration ([`DiscountTable`]), so tiers
//! can be tuned without touching logic. [`DiscountTable::default`] is the
//! single source of truth for the shop's tiers.
//!
//! All functions here are pure: no I/O, deterministic, idempotent.
//! Positive line quantities are a caller precondition, enforced at the
//! boundary by [`crate::validation::validate_quantity`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::CoreError;
use crate::money::Money;
use crate::types::{DeliveryOption, Product};

// =============================================================================
// Discount Table
// =============================================================================

/// A single discount tier: carts with at least `min_quantity` regular items
/// get `discount_bps` off the regular subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountTier {
    /// Minimum regular quantity for this tier (inclusive).
    pub min_quantity: i64,

    /// Discount in basis points (2500 = 25%).
    pub discount_bps: u32,
}

/// The ordered quantity-discount table, evaluated highest threshold first.
///
/// ## Canonical tiers
///
/// | regular quantity | discount |
/// |---|---|
/// | ≥ 21 | 25% |
/// | 16–20 | 20% |
/// | 11–15 | 15% |
/// | 6–10 | 10% |
/// | 0–5 | 0% |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountTable {
    tiers: Vec<DiscountTier>,
}

impl DiscountTable {
    /// Builds a table from tiers ordered highest threshold first.
    ///
    /// ## Rules
    /// - thresholds strictly decreasing, all positive
    /// - discounts non-increasing as the threshold decreases, so the
    ///   discount never shrinks when more regular items are added
    /// - no discount above 100%
    pub fn new(tiers: Vec<DiscountTier>) -> Result<Self, CoreError> {
        for pair in tiers.windows(2) {
            if pair[1].min_quantity >= pair[0].min_quantity {
                return Err(CoreError::InvalidDiscountTable {
                    reason: "tier thresholds must be strictly decreasing".to_string(),
                });
            }
            if pair[1].discount_bps > pair[0].discount_bps {
                return Err(CoreError::InvalidDiscountTable {
                    reason: "discounts must not increase as thresholds decrease".to_string(),
                });
            }
        }
        if tiers.iter().any(|t| t.min_quantity <= 0) {
            return Err(CoreError::InvalidDiscountTable {
                reason: "tier thresholds must be positive".to_string(),
            });
        }
        if tiers.iter().any(|t| t.discount_bps > 10_000) {
            return Err(CoreError::InvalidDiscountTable {
                reason: "discount cannot exceed 100%".to_string(),
            });
        }
        Ok(DiscountTable { tiers })
    }

    /// Discount (in basis points) for the given regular quantity.
    ///
    /// First tier whose threshold is met wins; below every threshold the
    /// discount is zero.
    pub fn discount_bps_for(&self, regular_quantity: i64) -> u32 {
        self.tiers
            .iter()
            .find(|t| regular_quantity >= t.min_quantity)
            .map_or(0, |t| t.discount_bps)
    }
}

impl Default for DiscountTable {
    fn default() -> Self {
        DiscountTable {
            tiers: vec![
                DiscountTier { min_quantity: 21, discount_bps: 2500 },
                DiscountTier { min_quantity: 16, discount_bps: 2000 },
                DiscountTier { min_quantity: 11, discount_bps: 1500 },
                DiscountTier { min_quantity: 6, discount_bps: 1000 },
            ],
        }
    }
}

// =============================================================================
// Discount Breakdown
// =============================================================================

/// The result of pricing a cart. Derived on every cart mutation for
/// display; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountBreakdown {
    /// Total quantity of regular items.
    pub regular_quantity: i64,
    /// Total quantity of special items.
    pub special_quantity: i64,
    /// Regular subtotal before discount.
    pub regular_subtotal: Money,
    /// Special subtotal (never discounted).
    pub special_subtotal: Money,
    /// Applied discount in basis points.
    pub discount_bps: u32,
    /// Amount taken off the regular subtotal.
    pub discount_amount: Money,
    /// Charged total: discounted regular + special, rounded UP to a whole
    /// shekel. Delivery fees are added separately by [`checkout_total`].
    pub final_total: Money,
}

/// Prices a cart snapshot against a discount table.
///
/// Pure and idempotent: the same cart and table always produce the same
/// breakdown.
///
/// ## Example
/// ```rust
/// use sticker_core::cart::Cart;
/// use sticker_core::pricing::{compute_discount, DiscountTable};
/// # use sticker_core::types::Product;
/// # use chrono::Utc;
/// # fn product(id: &str, price_cents: i64) -> Product {
/// #     Product { id: id.into(), name: id.into(), price_cents, stock: 99,
/// #               collection: "retro".into(), image_url: None, created_at: Utc::now() }
/// # }
///
/// let mut cart = Cart::new();
/// cart.add_line(&product("a", 1000), 8); // 8 regular stickers at ₪10
///
/// let breakdown = compute_discount(&cart, &DiscountTable::default());
/// assert_eq!(breakdown.discount_bps, 1000); // 10%
/// assert_eq!(breakdown.final_total.cents(), 7200); // ₪72
/// ```
pub fn compute_discount(cart: &Cart, table: &DiscountTable) -> DiscountBreakdown {
    let regular_quantity = cart.regular_quantity();
    let special_quantity = cart.special_quantity();
    let regular_subtotal = cart.regular_subtotal();
    let special_subtotal = cart.special_subtotal();

    let discount_bps = table.discount_bps_for(regular_quantity);
    let discount_amount = regular_subtotal.percentage(discount_bps);

    let final_total =
        (regular_subtotal - discount_amount + special_subtotal).ceil_to_unit();

    DiscountBreakdown {
        regular_quantity,
        special_quantity,
        regular_subtotal,
        special_subtotal,
        discount_bps,
        discount_amount,
        final_total,
    }
}

/// Per-item effective price for display.
///
/// Regular items show the tier-discounted price; special items always show
/// full price.
pub fn discounted_unit_price(product: &Product, breakdown: &DiscountBreakdown) -> Money {
    if product.is_special() {
        product.price()
    } else {
        product.price().apply_percentage_discount(breakdown.discount_bps)
    }
}

/// The amount actually charged at checkout: the cart's final total plus
/// the delivery fee for the chosen option.
pub fn checkout_total(breakdown: &DiscountBreakdown, delivery: DeliveryOption) -> Money {
    breakdown.final_total + delivery.fee()
}

// =============================================================================
// Unit Tests
// =============================================================================
