//! # Domain Types
//!
//! The entities the shop trades in: catalog products, orders, and the
//! frozen line items that connect them.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │     Order       │   │   OrderLine     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  order_id (FK)  │   │
//! │  │  collection     │   │  status         │   │  product_id(FK) │   │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │   │
//! │  │  stock          │   │  delivery/pay   │   │  price snapshot │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! │                                                                     │
//! │  OrderStatus: pending → {confirmed | rejected}, confirmed→cancelled │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{DELIVERY_FEE_CENTS, SPECIAL_COLLECTION};

// =============================================================================
// Product
// =============================================================================

/// A sticker available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// UUID v4, generated at creation.
    pub id: String,

    /// Display name shown in the catalog and on orders.
    pub name: String,

    /// Price in agorot.
    pub price_cents: i64,

    /// Units currently in stock. Never negative.
    pub stock: i64,

    /// Collection tag. One distinguished value, [`SPECIAL_COLLECTION`],
    /// marks special items; everything else is a regular collection.
    pub collection: String,

    /// Optional catalog image.
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The catalog price as [`Money`].
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this product belongs to the special collection.
    ///
    /// Special items are exempt from quantity discounts and gated by the
    /// admission rules (at least ten regular items in the cart, at most
    /// three specials per order).
    #[inline]
    pub fn is_special(&self) -> bool {
        self.collection == SPECIAL_COLLECTION
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a customer order.
///
/// Transitions: `Pending → {Confirmed | Rejected}` and
/// `Confirmed → Cancelled`. Stock is debited exactly once, on the
/// pending→confirmed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Submitted by the customer, awaiting admin review.
    Pending,
    /// Accepted by the admin; stock has been debited.
    Confirmed,
    /// Declined by the admin; stock was never debited.
    Rejected,
    /// A confirmed order that was cancelled afterwards.
    Cancelled,
}

impl OrderStatus {
    /// Stable string form, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
///
/// Payment happens through static external links; the shop records the
/// chosen method and the admin verifies receipt manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Bit,
    Paypal,
    Paybox,
}

impl PaymentMethod {
    /// Stable string form, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Bit => "bit",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Paybox => "paybox",
        }
    }
}

// =============================================================================
// Delivery Option
// =============================================================================

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    /// Customer picks the order up in person. Free.
    SelfPickup,
    /// Shipped via Israel Post for a flat fee; requires an address.
    IsraelPost,
}

impl DeliveryOption {
    /// Whether this option ships to an address (and therefore requires
    /// the address fields on checkout).
    #[inline]
    pub fn requires_address(&self) -> bool {
        matches!(self, DeliveryOption::IsraelPost)
    }

    /// Flat delivery fee for this option.
    #[inline]
    pub fn fee(&self) -> Money {
        match self {
            DeliveryOption::SelfPickup => Money::zero(),
            DeliveryOption::IsraelPost => Money::from_cents(DELIVERY_FEE_CENTS),
        }
    }

    /// Stable string form, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::SelfPickup => "self_pickup",
            DeliveryOption::IsraelPost => "israel_post",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    /// Address fields; present iff the delivery option ships.
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub zip_code: Option<String>,
    /// Final charged total in agorot (whole shekels after ceil rounding,
    /// delivery fee included).
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the charged total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item on an order.
///
/// Uses the snapshot pattern: the price is frozen at order time and is
/// never recomputed from the live product, even if the catalog price
/// changes later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Quantity ordered. Always positive.
    pub quantity: i64,
    /// Unit price in agorot at order time (frozen).
    pub price_per_item_cents: i64,
}

impl OrderLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_per_item(&self) -> Money {
        Money::from_cents(self.price_per_item_cents)
    }

    /// Line total (frozen unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_per_item().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// New Order (checkout input)
// =============================================================================

/// Customer-supplied checkout fields for a new order.
///
/// Validated by [`crate::validation::validate_new_order`] before anything
/// touches the store: address fields are required iff the delivery option
/// ships.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub zip_code: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(collection: &str) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Crest 110".to_string(),
            price_cents: 1000,
            stock: 5,
            collection: collection.to_string(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_special() {
        assert!(product(SPECIAL_COLLECTION).is_special());
        assert!(!product("retro").is_special());
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_strings_roundtrip_serde() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        assert_eq!(OrderStatus::Confirmed.as_str(), "confirmed");

        let json = serde_json::to_string(&DeliveryOption::IsraelPost).unwrap();
        assert_eq!(json, "\"israel_post\"");
        assert_eq!(DeliveryOption::IsraelPost.as_str(), "israel_post");
    }

    #[test]
    fn test_delivery_fee() {
        assert!(DeliveryOption::SelfPickup.fee().is_zero());
        assert_eq!(DeliveryOption::IsraelPost.fee().cents(), DELIVERY_FEE_CENTS);
        assert!(DeliveryOption::IsraelPost.requires_address());
        assert!(!DeliveryOption::SelfPickup.requires_address());
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            id: "l1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            price_per_item_cents: 1000,
        };
        assert_eq!(line.line_total().cents(), 3000);
    }
}
