//! # Product Repository
//!
//! Database operations for the sticker catalog.
//!
//! ## Key Operations
//! - Catalog listing (whole shop, or per collection)
//! - Admin CRUD
//!
//! Stock debits for confirmed orders do NOT happen here; they are part of
//! the transactional flow in [`crate::reconciler::StockReconciler`]. Admin
//! edits set stock absolutely via [`ProductRepository::update`].

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sticker_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, price_cents, stock, collection, image_url, created_at";

/// SQL access to the `products` table.
///
/// ```rust,ignore
/// let catalog = db.products().list().await?;
/// let one = db.products().get_by_id(&id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Looks up a product; `Ok(None)` when the id is unknown.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists the whole catalog, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists products in a single collection, newest first.
    pub async fn list_by_collection(&self, collection: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE collection = ?1 ORDER BY created_at DESC, name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Adds a product to the catalog. The id is generated by the caller
    /// (see [`generate_product_id`]).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (id, name, price_cents, stock, collection, image_url, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.collection)
        .bind(&product.image_url)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product, including an absolute stock level.
    ///
    /// This is the admin edit path; it fails with [`DbError::NotFound`]
    /// for an unknown id. Stock debits for confirmed orders go through
    /// the reconciler's conditional decrement instead, never through
    /// here.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            "UPDATE products SET \
                name = ?2, \
                price_cents = ?3, \
                stock = ?4, \
                collection = ?5, \
                image_url = ?6 \
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.collection)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product from the catalog.
    ///
    /// Fails with a foreign-key violation while order lines still
    /// reference the product; those orders must be deleted first.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fresh UUID for a catalog product.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
