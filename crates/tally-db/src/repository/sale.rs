//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Checkout Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   commit(&sale) - ONE transaction                       │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── 1. INSERT sales row + sale_items snapshots                       │
//! │   │                                                                     │
//! │   ├── 2. For each line:                                                │
//! │   │      SELECT name, stock   ← live stock, read inside the tx         │
//! │   │      stock < quantity?  ──► InsufficientStock ─┐                   │
//! │   │      UPDATE stock = stock - quantity            │                   │
//! │   │                                                 │                   │
//! │   ├── 3. Customer attached?                         │                   │
//! │   │      total_purchases += total                   │                   │
//! │   │      no such customer?  ──► NotFound ──────────┤                   │
//! │   │                                                 ▼                   │
//! │  COMMIT                                     ROLLBACK (tx dropped)      │
//! │                                                                         │
//! │  Either everything is written or nothing is.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable: there is no update path.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::{Quantity, Sale, SaleItem};

const SALE_COLUMNS: &str =
    "id, date, customer_id, subtotal_cents, tax_cents, total_cents, payment_method";

/// A `sale_items` row with its owning sale.
#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: i64,
    product_id: i64,
    name: String,
    price_cents: i64,
    quantity: Quantity,
    tax_rate_bps: u32,
}

impl SaleItemRow {
    fn into_item(self) -> SaleItem {
        SaleItem {
            product_id: self.product_id,
            name: self.name,
            price_cents: self.price_cents,
            quantity: self.quantity,
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a checkout.
    ///
    /// ## What This Does
    /// 1. Persists the sale and its line snapshots
    /// 2. Decrements each product's stock, re-checking live stock first
    /// 3. Adds the total to the attached customer's running purchases
    ///
    /// All three steps share one transaction. Any failure (missing product,
    /// insufficient stock, missing customer, store error) rolls back.
    ///
    /// ## Returns
    /// The sale as stored, with its assigned id.
    pub async fn commit(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(lines = sale.items.len(), total = sale.total_cents, "Committing sale");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sale_id = insert_row(&mut tx, sale, None).await?;

        for item in &sale.items {
            let live: Option<(String, Quantity)> =
                sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let (name, stock) =
                live.ok_or_else(|| DbError::not_found("Product", item.product_id.to_string()))?;

            if stock < item.quantity {
                return Err(DbError::InsufficientStock {
                    name,
                    available: stock,
                    requested: item.quantity,
                });
            }

            sqlx::query("UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1")
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(customer_id) = sale.customer_id {
            let result = sqlx::query(
                r#"
                UPDATE customers SET
                    total_purchases_cents = total_purchases_cents + ?2,
                    updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(sale.total_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Customer", customer_id.to_string()));
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(sale_id = %sale_id, total = sale.total_cents, "Sale committed");

        Ok(Sale {
            id: sale_id,
            ..sale.clone()
        })
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, SaleItemRow>(
            "SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        sale.items = rows.into_iter().map(SaleItemRow::into_item).collect();
        Ok(Some(sale))
    }

    /// Lists every sale with items, in id order.
    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY id");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, SaleItemRow>(
            "SELECT * FROM sale_items ORDER BY sale_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(attach_items(sales, rows))
    }

    /// Sales for one customer (secondary index on `customer_id`).
    pub async fn list_by_customer(&self, customer_id: i64) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE customer_id = ?1 ORDER BY id");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_items.* FROM sale_items
            INNER JOIN sales ON sales.id = sale_items.sale_id
            WHERE sales.customer_id = ?1
            ORDER BY sale_items.sale_id, sale_items.position
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attach_items(sales, rows))
    }

    /// Inserts imported sales in one transaction, ignoring their ids.
    ///
    /// Stock and customer totals are not touched; these are historical records.
    pub async fn insert_many(&self, sales: &[Sale]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for sale in sales {
            insert_row(&mut tx, sale, None).await?;
        }

        tx.commit().await?;

        info!(count = sales.len(), "Imported sales");
        Ok(sales.len())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn attach_items(mut sales: Vec<Sale>, rows: Vec<SaleItemRow>) -> Vec<Sale> {
    let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
    for row in rows {
        by_sale.entry(row.sale_id).or_default().push(row.into_item());
    }

    for sale in &mut sales {
        sale.items = by_sale.remove(&sale.id).unwrap_or_default();
    }
    sales
}

/// Inserts a sale row and its items, returning the sale id.
pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    sale: &Sale,
    id: Option<i64>,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sales (
            id, date, customer_id, subtotal_cents, tax_cents, total_cents, payment_method
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(id)
    .bind(sale.date)
    .bind(sale.customer_id)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .execute(&mut *conn)
    .await?;

    let sale_id = result.last_insert_rowid();

    for (position, item) in sale.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, position, product_id, name, price_cents, quantity, tax_rate_bps
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(sale_id)
        .bind(position as i64)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(item.quantity)
        .bind(item.tax_rate_bps)
        .execute(&mut *conn)
        .await?;
    }

    Ok(sale_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
