//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! 1. SUBMIT (reconciler::submit_order)
//!    └── insert_order() + insert_lines()   status: pending
//!
//! 2. ADMIN REVIEW
//!    ├── confirm (reconciler::confirm_order)   pending → confirmed
//!    │   └── debits stock, transactionally
//!    ├── reject  (reconciler::reject_order)    pending → rejected
//!    └── cancel  (reconciler::cancel_order)    confirmed → cancelled
//!
//! 3. (OPTIONAL) admin edit / delete
//!    └── update_details() / delete() (lines cascade)
//! ```
//!
//! Status transitions are guarded (`WHERE status = ?`) so a concurrent or
//! repeated transition shows up as zero affected rows instead of silently
//! overwriting state.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sticker_core::{NewOrder, Order, OrderLine, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_name, phone, delivery_option, payment_method, \
     city, street, house_number, zip_code, total_cents, status, created_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, quantity, price_per_item_cents";

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets all line items for an order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM order_items WHERE order_id = ?1");
        let lines = sqlx::query_as::<_, OrderLine>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Gets an order together with its line items.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<OrderWithLines>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let lines = self.get_lines(id).await?;
        Ok(Some(OrderWithLines { order, lines }))
    }

    /// Lists all orders, newest first (the admin order board).
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Inserts an order row.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = order.total_cents, "Inserting order");

        sqlx::query(
            "INSERT INTO orders (\
                id, customer_name, phone, delivery_option, payment_method, \
                city, street, house_number, zip_code, total_cents, status, created_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(order.delivery_option)
        .bind(order.payment_method)
        .bind(&order.city)
        .bind(&order.street)
        .bind(&order.house_number)
        .bind(&order.zip_code)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the line items for an order.
    ///
    /// Line items freeze the unit price at order time (snapshot pattern),
    /// so the order history survives later catalog price changes.
    pub async fn insert_lines(&self, lines: &[OrderLine]) -> DbResult<()> {
        for line in lines {
            debug!(order_id = %line.order_id, product_id = %line.product_id, "Inserting order line");

            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price_per_item_cents) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.price_per_item_cents)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Transitions an order's status, guarded by the expected current
    /// status.
    ///
    /// ## Returns
    /// * `Ok(true)` - the transition happened
    /// * `Ok(false)` - the order exists but was not in `expected` status,
    ///   or does not exist (callers disambiguate via [`get_by_id`])
    ///
    /// [`get_by_id`]: OrderRepository::get_by_id
    pub async fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> DbResult<bool> {
        debug!(
            order_id = %order_id,
            from = expected.as_str(),
            to = new_status.as_str(),
            "Updating order status"
        );

        let result = sqlx::query("UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(order_id)
            .bind(expected)
            .bind(new_status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates an order's customer/delivery details (admin edit).
    ///
    /// Status, totals and line items are not editable here; totals are
    /// frozen at submission and status moves only through the guarded
    /// transitions.
    pub async fn update_details(&self, order_id: &str, details: &NewOrder) -> DbResult<()> {
        debug!(order_id = %order_id, "Updating order details");

        let result = sqlx::query(
            "UPDATE orders SET \
                customer_name = ?2, \
                phone = ?3, \
                delivery_option = ?4, \
                payment_method = ?5, \
                city = ?6, \
                street = ?7, \
                house_number = ?8, \
                zip_code = ?9 \
             WHERE id = ?1",
        )
        .bind(order_id)
        .bind(&details.customer_name)
        .bind(&details.phone)
        .bind(details.delivery_option)
        .bind(details.payment_method)
        .bind(&details.city)
        .bind(&details.street)
        .bind(&details.house_number)
        .bind(&details.zip_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Deletes an order. Line items cascade via the foreign key.
    pub async fn delete(&self, order_id: &str) -> DbResult<()> {
        debug!(order_id = %order_id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{catalog_product, pending_order, pickup_details};
    use sticker_core::DeliveryOption;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_load_order_with_lines() {
        let db = test_db().await;
        let product = catalog_product("Crest 110", 1000, 25);
        db.products().insert(&product).await.unwrap();

        let order = pending_order(7200, DeliveryOption::SelfPickup);
        db.orders().insert_order(&order).await.unwrap();

        let line = OrderLine {
            id: generate_line_id(),
            order_id: order.id.clone(),
            product_id: product.id.clone(),
            quantity: 8,
            price_per_item_cents: 1000,
        };
        db.orders().insert_lines(&[line]).await.unwrap();

        let loaded = db.orders().get_with_lines(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.order.status, OrderStatus::Pending);
        assert_eq!(loaded.order.total_cents, 7200);
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].quantity, 8);
        assert_eq!(loaded.lines[0].line_total().cents(), 8000);
    }

    #[tokio::test]
    async fn test_guarded_status_transition() {
        let db = test_db().await;
        let order = pending_order(1000, DeliveryOption::SelfPickup);
        db.orders().insert_order(&order).await.unwrap();

        // pending → rejected succeeds
        assert!(db
            .orders()
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
            .unwrap());

        // Repeating the same transition is a no-op
        assert!(!db
            .orders()
            .update_status(&order.id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
            .unwrap());

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Rejected);
    }

    #[tokio::test]
    async fn test_update_details() {
        let db = test_db().await;
        let order = pending_order(1000, DeliveryOption::SelfPickup);
        db.orders().insert_order(&order).await.unwrap();

        let mut details = pickup_details();
        details.customer_name = "Noa Mizrahi".to_string();
        db.orders().update_details(&order.id, &details).await.unwrap();

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.customer_name, "Noa Mizrahi");
        // Totals and status untouched by detail edits
        assert_eq!(loaded.total_cents, 1000);
        assert_eq!(loaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_lines() {
        let db = test_db().await;
        let product = catalog_product("Crest 110", 1000, 25);
        db.products().insert(&product).await.unwrap();

        let order = pending_order(2000, DeliveryOption::SelfPickup);
        db.orders().insert_order(&order).await.unwrap();
        db.orders()
            .insert_lines(&[OrderLine {
                id: generate_line_id(),
                order_id: order.id.clone(),
                product_id: product.id.clone(),
                quantity: 2,
                price_per_item_cents: 1000,
            }])
            .await
            .unwrap();

        db.orders().delete(&order.id).await.unwrap();

        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.orders().get_lines(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let db = test_db().await;
        for total in [1000, 2000] {
            let order = pending_order(total, DeliveryOption::SelfPickup);
            db.orders().insert_order(&order).await.unwrap();
        }
        assert_eq!(db.orders().list().await.unwrap().len(), 2);
    }
}
