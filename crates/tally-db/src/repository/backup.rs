//! # Backup Repository
//!
//! Whole-store operations over the four primary collections.
//!
//! ## Restore
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  restore(&backup) - ONE transaction                                     │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── DELETE sale_items, sales, products, customers, categories        │
//! │   ├── INSERT categories   (ids preserved)                              │
//! │   ├── INSERT products     (ids preserved)                              │
//! │   ├── INSERT customers    (ids preserved)                              │
//! │   └── INSERT sales+items  (ids preserved)                              │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Settings and the template catalog are never touched.                  │
//! │  A bad record rolls the store back to what it was before.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::DbResult;
use crate::repository::{category, customer, product, sale, settings::SettingsRepository};
use crate::repository::{
    category::CategoryRepository, customer::CustomerRepository, product::ProductRepository,
    sale::SaleRepository,
};
use tally_core::export::build_backup;
use tally_core::{Backup, SettingsRecord, SETTINGS_KEY};

/// Record counts written by a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreSummary {
    pub products: usize,
    pub customers: usize,
    pub sales: usize,
    pub categories: usize,
}

#[derive(Debug, Clone)]
pub struct BackupRepository {
    pool: SqlitePool,
}

impl BackupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BackupRepository { pool }
    }

    /// Reads every collection into a backup document stamped with `now`.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> DbResult<Backup> {
        let products = ProductRepository::new(self.pool.clone()).list_all().await?;
        let customers = CustomerRepository::new(self.pool.clone()).list_all().await?;
        let sales = SaleRepository::new(self.pool.clone()).list_all().await?;
        let categories = CategoryRepository::new(self.pool.clone()).list_all().await?;

        let settings = SettingsRepository::new(self.pool.clone())
            .load()
            .await?
            .map(|settings| SettingsRecord {
                key: SETTINGS_KEY.to_string(),
                settings,
            })
            .into_iter()
            .collect();

        Ok(build_backup(products, customers, sales, categories, settings, now))
    }

    /// Replaces the four primary collections with the backup's contents.
    pub async fn restore(&self, backup: &Backup) -> DbResult<RestoreSummary> {
        info!(
            version = %backup.version,
            products = backup.products.len(),
            sales = backup.sales.len(),
            "Restoring backup"
        );

        let mut tx = self.pool.begin().await?;

        clear_collections(&mut tx).await?;

        for record in &backup.categories {
            category::insert_row(&mut tx, &record.name, preserved(record.id)).await?;
        }
        for record in &backup.products {
            product::insert_row(&mut tx, record, preserved(record.id)).await?;
        }
        for record in &backup.customers {
            customer::insert_row(&mut tx, record, preserved(record.id)).await?;
        }
        for record in &backup.sales {
            sale::insert_row(&mut tx, record, preserved(record.id)).await?;
        }

        tx.commit().await?;

        let summary = RestoreSummary {
            products: backup.products.len(),
            customers: backup.customers.len(),
            sales: backup.sales.len(),
            categories: backup.categories.len(),
        };
        info!(?summary, "Backup restored");
        Ok(summary)
    }

    /// Empties the four primary collections.
    pub async fn clear_all(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        clear_collections(&mut tx).await?;
        tx.commit().await?;

        info!("All data cleared");
        Ok(())
    }
}

/// Hand-written backups may omit ids; let the store assign those.
fn preserved(id: i64) -> Option<i64> {
    (id > 0).then_some(id)
}

async fn clear_collections(conn: &mut SqliteConnection) -> DbResult<()> {
    for table in ["sale_items", "sales", "products", "customers", "categories"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
