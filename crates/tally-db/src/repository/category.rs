//! # Category Repository
//!
//! Categories are a bare name. Deleting one leaves products pointing at the
//! old id; the terminal shows those as uncategorized.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::{Category, DEFAULT_CATEGORIES};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories in creation order.
    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        debug!(name = %name, "Inserting category");

        let mut conn = self.pool.acquire().await?;
        let id = insert_row(&mut conn, name, None).await?;

        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub async fn rename(&self, id: i64, name: &str) -> DbResult<Category> {
        debug!(id = %id, name = %name, "Renaming category");

        let result = sqlx::query("UPDATE categories SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id.to_string()));
        }

        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id.to_string()));
        }

        Ok(())
    }

    /// Inserts the default categories when the collection is empty.
    ///
    /// Returns how many were inserted (0 when categories already exist).
    pub async fn seed_defaults(&self) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        for name in DEFAULT_CATEGORIES {
            insert_row(&mut tx, name, None).await?;
        }
        tx.commit().await?;

        info!(count = DEFAULT_CATEGORIES.len(), "Seeded default categories");
        Ok(DEFAULT_CATEGORIES.len())
    }

    /// Inserts many categories in one transaction, ignoring their ids.
    pub async fn insert_many(&self, categories: &[Category]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for category in categories {
            insert_row(&mut tx, &category.name, None).await?;
        }

        tx.commit().await?;

        info!(count = categories.len(), "Imported categories");
        Ok(categories.len())
    }
}

pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    name: &str,
    id: Option<i64>,
) -> DbResult<i64> {
    let result = sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
        .bind(id)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.categories().seed_defaults().await.unwrap(), 8);
        assert_eq!(db.categories().seed_defaults().await.unwrap(), 0);

        let names: Vec<String> = db
            .categories()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names[0], "General");
        assert_eq!(names[3], "Food & Beverages");
    }

    #[tokio::test]
    async fn test_user_category_blocks_seeding() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.categories().insert("Toys").await.unwrap();

        assert_eq!(db.categories().seed_defaults().await.unwrap(), 0);
        assert_eq!(db.categories().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let toys = db.categories().insert("Toys").await.unwrap();

        db.categories().rename(toys.id, "Games").await.unwrap();
        let fetched = db.categories().get_by_id(toys.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Games");

        db.categories().delete(toys.id).await.unwrap();
        assert!(matches!(
            db.categories().rename(toys.id, "Again").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
