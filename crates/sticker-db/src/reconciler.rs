//! # Stock Reconciler
//!
//! The store-facing half of the engine: validates carts against live
//! stock, persists checkout submissions, and drives the order lifecycle
//! transitions that touch inventory.
//!
//! ## Confirmation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     confirm_order(order_id)                         │
//! │                                                                     │
//! │  BEGIN TRANSACTION                                                  │
//! │    1. load order, require status = pending                          │
//! │    2. load line items joined with live product stock                │
//! │    3. verify EVERY line: stock >= quantity                          │
//! │       └── any shortfall → ROLLBACK, report all shortfalls           │
//! │    4. debit each line: stock = stock - qty WHERE stock >= qty       │
//! │       └── conditional update lost a race → ROLLBACK                 │
//! │    5. status: pending → confirmed (guarded)                         │
//! │  COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation of all lines completes before any debit is applied, and the
//! surrounding transaction means a mid-sequence failure leaves no partial
//! debit behind.
//!
//! There is deliberately NO reservation or locking between cart-time
//! validation and confirmation: stock can race in that window. The
//! conditional decrement turns a lost race into an out-of-stock failure
//! instead of negative inventory.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};
use crate::repository::order::{generate_line_id, generate_order_id, OrderRepository};
use crate::repository::product::ProductRepository;
use sticker_core::validation::{validate_cart, validate_new_order};
use sticker_core::{
    checkout_total, compute_discount, Cart, DiscountTable, NewOrder, Order, OrderLine,
    OrderStatus, ValidationError,
};

// =============================================================================
// Error Types
// =============================================================================

/// A per-product stock shortfall, reported with enough context for a
/// complete user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub product_id: String,
    pub name: String,
    pub requested: i64,
    pub available: i64,
}

/// Errors from checkout submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Checkout fields or cart contents failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// One or more cart lines exceed live stock. Collected across the
    /// whole cart, not fail-fast, so the customer sees the full picture.
    #[error("Insufficient stock for {} product(s)", .0.len())]
    OutOfStock(Vec<StockShortfall>),

    /// The store rejected a write.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Errors from confirming an order.
#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order was already confirmed. Stock is never debited twice.
    #[error("Order {0} is already confirmed")]
    AlreadyConfirmed(String),

    /// The order is in a status that does not allow this transition.
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidStatus {
        order_id: String,
        current_status: String,
    },

    /// Stock dropped below requirements between validation and
    /// confirmation. The order stays pending and nothing was debited.
    #[error("Insufficient stock for {} product(s)", .0.len())]
    OutOfStock(Vec<StockShortfall>),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Errors from the stock-neutral transitions (reject, cancel).
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidStatus {
        order_id: String,
        current_status: String,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Row Types
// =============================================================================

/// An order line joined with its product's live stock, summed per product.
#[derive(Debug, sqlx::FromRow)]
struct LineStock {
    product_id: String,
    name: String,
    quantity: i64,
    stock: i64,
}

// =============================================================================
// Stock Reconciler
// =============================================================================

/// Validates carts against live stock and reconciles stock on order
/// confirmation.
///
/// Stock is re-read from the store on every call - never cached across
/// requests.
#[derive(Debug, Clone)]
pub struct StockReconciler {
    pool: SqlitePool,
}

impl StockReconciler {
    /// Creates a new StockReconciler.
    pub fn new(pool: SqlitePool) -> Self {
        StockReconciler { pool }
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Validates a cart against live stock before checkout.
    ///
    /// Re-reads current stock for every distinct product and collects ALL
    /// shortfalls rather than failing on the first, so the storefront can
    /// present the complete picture. A product missing from the catalog is
    /// reported as a shortfall with zero availability.
    ///
    /// Does NOT reserve stock: quantities can still race between this
    /// check and confirmation.
    pub async fn validate_cart(&self, cart: &Cart) -> Result<(), SubmitError> {
        let products = self.products();
        let mut shortfalls = Vec::new();

        for line in &cart.lines {
            match products.get_by_id(&line.product.id).await? {
                Some(live) if live.stock >= line.quantity => {}
                Some(live) => shortfalls.push(StockShortfall {
                    product_id: live.id,
                    name: live.name,
                    requested: line.quantity,
                    available: live.stock,
                }),
                None => shortfalls.push(StockShortfall {
                    product_id: line.product.id.clone(),
                    name: line.product.name.clone(),
                    requested: line.quantity,
                    available: 0,
                }),
            }
        }

        if shortfalls.is_empty() {
            Ok(())
        } else {
            Err(SubmitError::OutOfStock(shortfalls))
        }
    }

    /// Submits a checkout: creates the order and its line items.
    ///
    /// ## Steps
    /// 1. Validate checkout fields and cart contents (never reaches the
    ///    store on bad input)
    /// 2. Validate the cart against live stock
    /// 3. Price the cart server-side (discount table + delivery fee)
    /// 4. Insert the order row, then the line items; if line insertion
    ///    fails the orphaned order row is deleted again (compensating
    ///    action), so order creation is all-or-nothing to the caller
    ///
    /// Stock is NOT debited here; that happens when the admin confirms.
    pub async fn submit_order(
        &self,
        details: &NewOrder,
        cart: &Cart,
        table: &DiscountTable,
    ) -> Result<Order, SubmitError> {
        validate_new_order(details)?;
        validate_cart(cart)?;
        self.validate_cart(cart).await?;

        let breakdown = compute_discount(cart, table);
        let total = checkout_total(&breakdown, details.delivery_option);

        let order = Order {
            id: generate_order_id(),
            customer_name: details.customer_name.clone(),
            phone: details.phone.clone(),
            delivery_option: details.delivery_option,
            payment_method: details.payment_method,
            city: details.city.clone(),
            street: details.street.clone(),
            house_number: details.house_number.clone(),
            zip_code: details.zip_code.clone(),
            total_cents: total.cents(),
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now(),
        };

        let lines: Vec<OrderLine> = cart
            .lines
            .iter()
            .map(|l| OrderLine {
                id: generate_line_id(),
                order_id: order.id.clone(),
                product_id: l.product.id.clone(),
                quantity: l.quantity,
                // Price snapshot: frozen now, never recomputed later
                price_per_item_cents: l.product.price_cents,
            })
            .collect();

        let orders = self.orders();
        orders.insert_order(&order).await?;

        if let Err(e) = orders.insert_lines(&lines).await {
            // Compensating action: don't leave a headless order behind
            warn!(order_id = %order.id, error = %e, "Line insertion failed, deleting orphaned order");
            if let Err(cleanup) = orders.delete(&order.id).await {
                warn!(order_id = %order.id, error = %cleanup, "Failed to delete orphaned order");
            }
            return Err(e.into());
        }

        info!(
            order_id = %order.id,
            total = %total,
            lines = lines.len(),
            "Order submitted"
        );

        Ok(order)
    }

    /// Confirms a pending order, debiting stock for every line.
    ///
    /// All-or-nothing inside a single transaction: every line is verified
    /// against live stock before any debit, each debit is a conditional
    /// decrement, and any failure rolls the whole confirmation back. See
    /// the module docs for the exact flow.
    pub async fn confirm_order(&self, order_id: &str) -> Result<(), ConfirmError> {
        debug!(order_id = %order_id, "Confirming order");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // 1. Order must exist and be pending
        let status: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DbError::from)?;

        match status {
            None => return Err(ConfirmError::OrderNotFound(order_id.to_string())),
            Some(OrderStatus::Pending) => {}
            Some(OrderStatus::Confirmed) => {
                return Err(ConfirmError::AlreadyConfirmed(order_id.to_string()))
            }
            Some(other) => {
                return Err(ConfirmError::InvalidStatus {
                    order_id: order_id.to_string(),
                    current_status: other.as_str().to_string(),
                })
            }
        }

        // 2. Load line quantities joined with live stock, summed per
        //    product so the check covers the order-wide quantity
        let lines: Vec<LineStock> = sqlx::query_as(
            "SELECT oi.product_id, p.name, SUM(oi.quantity) AS quantity, p.stock \
             FROM order_items oi \
             JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ?1 \
             GROUP BY oi.product_id, p.name, p.stock",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(DbError::from)?;

        // 3. Verify every line before touching any stock
        let shortfalls: Vec<StockShortfall> = lines
            .iter()
            .filter(|l| l.stock < l.quantity)
            .map(|l| StockShortfall {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                requested: l.quantity,
                available: l.stock,
            })
            .collect();

        if !shortfalls.is_empty() {
            // Transaction dropped here → rollback, order stays pending
            info!(
                order_id = %order_id,
                products = shortfalls.len(),
                "Confirmation blocked by stock shortfall"
            );
            return Err(ConfirmError::OutOfStock(shortfalls));
        }

        // 4. Debit stock with a conditional decrement per product; losing
        //    a race to a concurrent confirmation shows up as zero rows
        for line in &lines {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(line.quantity)
            .bind(&line.product_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                return Err(ConfirmError::OutOfStock(vec![StockShortfall {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    requested: line.quantity,
                    available: line.stock,
                }]));
            }
        }

        // 5. Flip status, still guarded by the expected current value
        let result =
            sqlx::query("UPDATE orders SET status = 'confirmed' WHERE id = ?1 AND status = 'pending'")
                .bind(order_id)
                .execute(&mut *tx)
                .await
                .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(ConfirmError::InvalidStatus {
                order_id: order_id.to_string(),
                current_status: "unknown".to_string(),
            });
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(order_id = %order_id, lines = lines.len(), "Order confirmed, stock debited");
        Ok(())
    }

    /// Rejects a pending order. Pure status transition: stock was never
    /// debited for a pending order, so there is nothing to restore.
    pub async fn reject_order(&self, order_id: &str) -> Result<(), TransitionError> {
        self.transition(order_id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
    }

    /// Cancels a confirmed order.
    ///
    /// Stock is NOT returned to inventory on cancellation. This mirrors
    /// the shop's historical behavior and is flagged as a pending product
    /// decision; do not "fix" it here without that call being made.
    pub async fn cancel_order(&self, order_id: &str) -> Result<(), TransitionError> {
        self.transition(order_id, OrderStatus::Confirmed, OrderStatus::Cancelled)
            .await
    }

    async fn transition(
        &self,
        order_id: &str,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<(), TransitionError> {
        let orders = self.orders();

        if orders.update_status(order_id, expected, new_status).await? {
            info!(order_id = %order_id, status = new_status.as_str(), "Order status updated");
            return Ok(());
        }

        // Zero rows: missing order, or a status other than expected
        match orders.get_by_id(order_id).await? {
            None => Err(TransitionError::OrderNotFound(order_id.to_string())),
            Some(order) => Err(TransitionError::InvalidStatus {
                order_id: order_id.to_string(),
                current_status: order.status.as_str().to_string(),
            }),
        }
    }
}

/// Fetches current stock for a single product (convenience for stock
/// badges on product pages).
pub async fn current_stock(pool: &SqlitePool, product_id: &str) -> DbResult<i64> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;

    stock.ok_or_else(|| DbError::not_found("Product", product_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{catalog_product, pickup_details, shipped_details};
    use sticker_core::{DeliveryOption, Product};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_cart(db: &Database, stock: i64, qty: i64) -> (Product, Cart) {
        let product = catalog_product("Crest 110", 1000, stock);
        db.products().insert(&product).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&product, qty);
        (product, cart)
    }

    #[tokio::test]
    async fn test_validate_cart_collects_all_shortfalls() {
        let db = test_db().await;
        let p1 = catalog_product("Crest 110", 1000, 2);
        let p2 = catalog_product("Retro Green", 1000, 50);
        let p3 = catalog_product("Champions 21", 1000, 1);
        for p in [&p1, &p2, &p3] {
            db.products().insert(p).await.unwrap();
        }

        let mut cart = Cart::new();
        cart.add_line(&p1, 5); // short by 3
        cart.add_line(&p2, 10); // fine
        cart.add_line(&p3, 2); // short by 1

        let err = db.reconciler().validate_cart(&cart).await.unwrap_err();
        match err {
            SubmitError::OutOfStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 2);
                assert!(shortfalls.iter().any(|s| s.product_id == p1.id && s.available == 2));
                assert!(shortfalls.iter().any(|s| s.product_id == p3.id && s.available == 1));
            }
            other => panic!("expected OutOfStock, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_cart_missing_product_reported_as_unavailable() {
        let db = test_db().await;
        let ghost = catalog_product("Ghost", 1000, 10);
        // Never inserted

        let mut cart = Cart::new();
        cart.add_line(&ghost, 1);

        let err = db.reconciler().validate_cart(&cart).await.unwrap_err();
        match err {
            SubmitError::OutOfStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].available, 0);
            }
            other => panic!("expected OutOfStock, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_order_prices_server_side() {
        let db = test_db().await;
        // 8 regular at ₪10 → 10% tier → ₪72, plus ₪15 shipping
        let (_, cart) = seeded_cart(&db, 50, 8).await;

        let order = db
            .reconciler()
            .submit_order(&shipped_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 8700);

        let loaded = db.orders().get_with_lines(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].price_per_item_cents, 1000);
    }

    #[tokio::test]
    async fn test_submit_order_rejects_empty_cart_and_bad_fields() {
        let db = test_db().await;
        let table = DiscountTable::default();

        // Empty cart never reaches the store
        let err = db
            .reconciler()
            .submit_order(&pickup_details(), &Cart::new(), &table)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));

        // Shipped order without an address is rejected up front
        let (_, cart) = seeded_cart(&db, 50, 2).await;
        let mut details = shipped_details();
        details.city = None;
        let err = db
            .reconciler()
            .submit_order(&details, &cart, &table)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));

        assert!(db.orders().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_order_deletes_orphaned_order_when_lines_fail() {
        let db = test_db().await;
        let healthy = catalog_product("Crest 110", 1000, 50);
        let tainted = catalog_product("Retro Green", 1000, 50);
        db.products().insert(&healthy).await.unwrap();
        db.products().insert(&tainted).await.unwrap();

        // A stale cart snapshot can carry values the schema refuses. The
        // order row (whole-cart total still positive) inserts fine; the
        // second line then trips the price CHECK constraint.
        let mut poisoned = tainted.clone();
        poisoned.price_cents = -1;
        let mut cart = Cart::new();
        cart.add_line(&healthy, 2);
        cart.add_line(&poisoned, 2);

        let err = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Db(_)));

        // Compensating delete ran: no headless order left behind
        assert!(db.orders().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_order_does_not_debit_stock() {
        let db = test_db().await;
        let (product, cart) = seeded_cart(&db, 50, 8).await;

        db.reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        // Stock untouched until the admin confirms
        assert_eq!(current_stock(db.pool(), &product.id).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_confirm_debits_stock_and_flips_status() {
        let db = test_db().await;
        let (product, cart) = seeded_cart(&db, 50, 8).await;
        let order = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        db.reconciler().confirm_order(&order.id).await.unwrap();

        assert_eq!(current_stock(db.pool(), &product.id).await.unwrap(), 42);
        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_is_all_or_nothing() {
        let db = test_db().await;
        let p1 = catalog_product("Crest 110", 1000, 50);
        let p2 = catalog_product("Retro Green", 1000, 50);
        db.products().insert(&p1).await.unwrap();
        db.products().insert(&p2).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&p1, 5);
        cart.add_line(&p2, 5);
        let order = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        // Stock of p2 drops to 2 between submission and confirmation
        let mut depleted = p2.clone();
        depleted.stock = 2;
        db.products().update(&depleted).await.unwrap();

        let err = db.reconciler().confirm_order(&order.id).await.unwrap_err();
        match err {
            ConfirmError::OutOfStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].product_id, p2.id);
                assert_eq!(shortfalls[0].available, 2);
            }
            other => panic!("expected OutOfStock, got {:?}", other),
        }

        // No partial debit: p1 untouched, order still pending
        assert_eq!(current_stock(db.pool(), &p1.id).await.unwrap(), 50);
        assert_eq!(current_stock(db.pool(), &p2.id).await.unwrap(), 2);
        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_double_confirm_never_double_debits() {
        let db = test_db().await;
        let (product, cart) = seeded_cart(&db, 50, 8).await;
        let order = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        db.reconciler().confirm_order(&order.id).await.unwrap();
        let err = db.reconciler().confirm_order(&order.id).await.unwrap_err();
        assert!(matches!(err, ConfirmError::AlreadyConfirmed(_)));

        // Debited exactly once
        assert_eq!(current_stock(db.pool(), &product.id).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_confirm_missing_order() {
        let db = test_db().await;
        let err = db.reconciler().confirm_order("nope").await.unwrap_err();
        assert!(matches!(err, ConfirmError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_reject_leaves_stock_alone() {
        let db = test_db().await;
        let (product, cart) = seeded_cart(&db, 50, 8).await;
        let order = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        db.reconciler().reject_order(&order.id).await.unwrap();

        assert_eq!(current_stock(db.pool(), &product.id).await.unwrap(), 50);
        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Rejected);

        // A rejected order cannot be confirmed afterwards
        let err = db.reconciler().confirm_order(&order.id).await.unwrap_err();
        assert!(matches!(err, ConfirmError::InvalidStatus { .. }));
    }

    #[tokio::test]
    async fn test_cancel_requires_confirmed_and_does_not_restock() {
        let db = test_db().await;
        let (product, cart) = seeded_cart(&db, 50, 8).await;
        let order = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();

        // Cancelling a pending order is invalid
        let err = db.reconciler().cancel_order(&order.id).await.unwrap_err();
        assert!(matches!(err, TransitionError::InvalidStatus { .. }));

        db.reconciler().confirm_order(&order.id).await.unwrap();
        db.reconciler().cancel_order(&order.id).await.unwrap();

        // Stock stays debited after cancellation
        assert_eq!(current_stock(db.pool(), &product.id).await.unwrap(), 42);
        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_delivery_option_changes_charged_total() {
        let db = test_db().await;
        let (_, cart) = seeded_cart(&db, 50, 8).await;

        let pickup = db
            .reconciler()
            .submit_order(&pickup_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();
        assert_eq!(pickup.total_cents, 7200);

        let shipped = db
            .reconciler()
            .submit_order(&shipped_details(), &cart, &DiscountTable::default())
            .await
            .unwrap();
        assert_eq!(shipped.total_cents, 8700);
        assert_eq!(shipped.delivery_option, DeliveryOption::IsraelPost);
    }
}
