//! # Receipt Template Catalog
//!
//! Metadata rows for the built-in templates. Rendering never reads these;
//! they exist so the catalog can be listed from the store.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use tally_core::{ReceiptTemplate, ReceiptTemplateMeta};

#[derive(Debug, Clone)]
pub struct ReceiptTemplateRepository {
    pool: SqlitePool,
}

impl ReceiptTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptTemplateRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<ReceiptTemplateMeta>> {
        let templates = sqlx::query_as::<_, ReceiptTemplateMeta>(
            "SELECT id, name, key FROM receipt_templates ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Seeds the seven built-in templates when the catalog is empty.
    pub async fn seed_defaults(&self) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt_templates")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let catalog = ReceiptTemplate::catalog();
        for meta in &catalog {
            sqlx::query("INSERT INTO receipt_templates (id, name, key) VALUES (?1, ?2, ?3)")
                .bind(meta.id)
                .bind(&meta.name)
                .bind(&meta.key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(count = catalog.len(), "Seeded receipt templates");
        Ok(catalog.len())
    }
}
