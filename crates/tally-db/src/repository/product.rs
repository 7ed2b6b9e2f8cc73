//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Manual stock adjustment (never below zero)
//! - Transactional bulk import
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ Read-modify-write (lost update between two writers)            │
//! │     SELECT stock → compute 7 → UPDATE products SET stock = 7       │
//! │                                                                     │
//! │  ✅ Guarded delta                                                   │
//! │     UPDATE products SET stock = stock + ?                          │
//! │     WHERE id = ? AND stock + ? BETWEEN 0 AND Quantity::MAX         │
//! │                                                                     │
//! │  Zero rows affected → product missing OR stock out of range        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::{Product, Quantity};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.list_all().await?;
/// let product = repo.get_by_id(42).await?;
/// let product = repo.adjust_stock(42, Quantity::from_units(-3)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// Any `id` on the input is ignored; the store assigns one.
    ///
    /// ## Returns
    /// The product as stored, carrying its new id.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let mut conn = self.pool.acquire().await?;
        let id = insert_row(&mut conn, product, None).await?;

        Ok(Product {
            id,
            ..product.clone()
        })
    }

    /// Writes the full record over the stored one and bumps `updated_at`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored record
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                barcode = ?4,
                category_id = ?5,
                description = ?6,
                price_cents = ?7,
                cost_cents = ?8,
                stock = ?9,
                unit = ?10,
                low_stock_threshold = ?11,
                tax_rate_bps = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.category_id)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock)
        .bind(&product.unit)
        .bind(product.low_stock_threshold)
        .bind(product.tax_rate_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id.to_string()));
        }

        Ok(Product {
            updated_at: now,
            ..product.clone()
        })
    }

    /// Adjusts stock by a signed amount.
    ///
    /// ## Rules
    /// - Positive delta restocks, negative delta removes
    /// - Stock never goes below zero: the write is rejected with
    ///   `DbError::InsufficientStock` and nothing changes
    /// - Stock never goes above `Quantity::MAX`: rejected with
    ///   `DbError::StockAboveMaximum`, so SQLite never overflows the column
    pub async fn adjust_stock(&self, id: i64, delta: Quantity) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();
        let max = Quantity::MAX;
        if !delta.is_in_range() {
            return Err(self.adjustment_rejected(id, delta).await?);
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                stock = stock + ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock + ?2 BETWEEN 0 AND ?4
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .bind(max)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.adjustment_rejected(id, delta).await?);
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    // Tells a missing product apart from a decrement below zero and an
    // increment above the maximum.
    async fn adjustment_rejected(&self, id: i64, delta: Quantity) -> DbResult<DbError> {
        let Some(product) = self.get_by_id(id).await? else {
            return Ok(DbError::not_found("Product", id.to_string()));
        };

        Ok(if delta.is_negative() {
            DbError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested: -delta,
            }
        } else {
            DbError::StockAboveMaximum {
                name: product.name,
                max: Quantity::MAX,
            }
        })
    }

    /// Deletes a product.
    ///
    /// Past sales keep their line snapshots, so nothing else is touched.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        Ok(())
    }

    /// Inserts many products in one transaction, ignoring their ids.
    ///
    /// A failing record rolls back the whole batch.
    pub async fn insert_many(&self, products: &[Product]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            insert_row(&mut tx, product, None).await?;
        }

        tx.commit().await?;

        info!(count = products.len(), "Imported products");
        Ok(products.len())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts one product row and returns its id.
///
/// `id = None` lets SQLite assign the next id; `Some` preserves one (restore).
pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    product: &Product,
    id: Option<i64>,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO products (
            id, name, sku, barcode, category_id, description,
            price_cents, cost_cents, stock, unit, low_stock_threshold,
            tax_rate_bps, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14
        )
        "#,
    )
    .bind(id)
    .bind(&product.name)
    .bind(&product.sku)
    .bind(&product.barcode)
    .bind(product.category_id)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(product.cost_cents)
    .bind(product.stock)
    .bind(&product.unit)
    .bind(product.low_stock_threshold)
    .bind(product.tax_rate_bps)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pretty_assertions::assert_eq;
    use tally_core::DEFAULT_LOW_STOCK_THRESHOLD;

    pub(crate) fn test_product(name: &str, sku: &str, stock: Quantity) -> Product {
        let now = Utc::now();
        Product {
            id: 0,
            name: name.to_string(),
            sku: sku.to_string(),
            barcode: None,
            category_id: None,
            description: String::new(),
            price_cents: 1000,
            cost_cents: 600,
            stock,
            unit: "pcs".to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            tax_rate_bps: 1000,
            created_at: now,
            updated_at: now,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_round_trips() {
        let db = db().await;
        let mut input = test_product("Rice", "RICE-1", Quantity::from_milli(2500));
        input.barcode = Some("5901234123457".to_string());
        input.id = 999;

        let stored = db.products().insert(&input).await.unwrap();
        assert_ne!(stored.id, 999);
        assert!(stored.id > 0);

        let fetched = db.products().get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Rice");
        assert_eq!(fetched.stock, Quantity::from_milli(2500));
        assert_eq!(fetched.barcode.as_deref(), Some("5901234123457"));
        assert_eq!(fetched.tax_rate_bps, 1000);
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let db = db().await;
        for (name, sku) in [("Tea", "T-1"), ("Apples", "A-1"), ("Milk", "M-1")] {
            db.products()
                .insert(&test_product(name, sku, Quantity::from_units(1)))
                .await
                .unwrap();
        }

        let names: Vec<String> = db
            .products()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Apples", "Milk", "Tea"]);
    }

    #[tokio::test]
    async fn test_update_and_missing_update() {
        let db = db().await;
        let mut product = db
            .products()
            .insert(&test_product("Soap", "SOAP-1", Quantity::from_units(3)))
            .await
            .unwrap();

        product.price_cents = 250;
        product.category_id = Some(2);
        db.products().update(&product).await.unwrap();

        let fetched = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 250);
        assert_eq!(fetched.category_id, Some(2));

        product.id = 4242;
        let err = db.products().update(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let db = db().await;
        let product = db
            .products()
            .insert(&test_product("Flour", "FL-1", Quantity::from_units(5)))
            .await
            .unwrap();

        let restocked = db
            .products()
            .adjust_stock(product.id, Quantity::from_milli(2500))
            .await
            .unwrap();
        assert_eq!(restocked.stock, Quantity::from_milli(7500));

        let err = db
            .products()
            .adjust_stock(product.id, Quantity::from_units(-8))
            .await
            .unwrap_err();
        match err {
            DbError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, Quantity::from_milli(7500));
                assert_eq!(requested, Quantity::from_units(8));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Exactly to zero is allowed
        let emptied = db
            .products()
            .adjust_stock(product.id, Quantity::from_milli(-7500))
            .await
            .unwrap();
        assert!(emptied.stock.is_zero());

        let err = db
            .products()
            .adjust_stock(777, Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_stays_below_maximum() {
        let db = db().await;
        let product = db
            .products()
            .insert(&test_product("Salt", "SALT-1", Quantity::from_units(5)))
            .await
            .unwrap();

        let err = db
            .products()
            .adjust_stock(product.id, Quantity::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockAboveMaximum { .. }));

        let err = db
            .products()
            .adjust_stock(product.id, Quantity::from_milli(i64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockAboveMaximum { .. }));

        // Nothing was written and the table still decodes
        let all = db.products().list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].stock, Quantity::from_units(5));

        let topped_up = db
            .products()
            .adjust_stock(product.id, Quantity::MAX - Quantity::from_units(5))
            .await
            .unwrap();
        assert_eq!(topped_up.stock, Quantity::MAX);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let product = db
            .products()
            .insert(&test_product("Gum", "GUM-1", Quantity::ONE))
            .await
            .unwrap();

        db.products().delete(product.id).await.unwrap();
        assert!(db.products().get_by_id(product.id).await.unwrap().is_none());
        assert!(matches!(
            db.products().delete(product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_many_and_count() {
        let db = db().await;
        let batch = vec![
            test_product("A", "A-1", Quantity::ONE),
            test_product("B", "B-1", Quantity::ONE),
        ];

        assert_eq!(db.products().insert_many(&batch).await.unwrap(), 2);
        assert_eq!(db.products().count().await.unwrap(), 2);
    }
}
