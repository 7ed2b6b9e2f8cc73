//! # Customer Repository
//!
//! Database operations for customers.
//!
//! `total_purchases_cents` is written here only on insert and restore.
//! Checkout bumps it inside the sale transaction (see [`super::sale`]).

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists every customer, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a new customer and returns it with its assigned id.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(name = %customer.name, "Inserting customer");

        let mut conn = self.pool.acquire().await?;
        let id = insert_row(&mut conn, customer, None).await?;

        Ok(Customer {
            id,
            ..customer.clone()
        })
    }

    /// Writes the editable fields over the stored record.
    ///
    /// The running purchase total is left alone; only checkout moves it.
    pub async fn update(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer.id.to_string()));
        }

        self.get_by_id(customer.id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer.id.to_string()))
    }

    /// Deletes a customer. Their past sales keep the dangling id.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id.to_string()));
        }

        Ok(())
    }

    /// Inserts many customers in one transaction, ignoring their ids.
    pub async fn insert_many(&self, customers: &[Customer]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for customer in customers {
            insert_row(&mut tx, customer, None).await?;
        }

        tx.commit().await?;

        info!(count = customers.len(), "Imported customers");
        Ok(customers.len())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    customer: &Customer,
    id: Option<i64>,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO customers (
            id, name, phone, email, address, notes,
            total_purchases_cents, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.address)
    .bind(&customer.notes)
    .bind(customer.total_purchases_cents)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pretty_assertions::assert_eq;

    pub(crate) fn test_customer(name: &str, phone: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: 0,
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            address: None,
            notes: String::new(),
            total_purchases_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut customer = test_customer("Ana Silva", "555-123-4567");
        customer.email = Some("ana@example.com".to_string());
        let stored = db.customers().insert(&customer).await.unwrap();
        assert!(stored.id > 0);

        let mut edited = stored.clone();
        edited.notes = "Prefers card".to_string();
        edited.total_purchases_cents = 99_999;
        let updated = db.customers().update(&edited).await.unwrap();
        assert_eq!(updated.notes, "Prefers card");
        // Not an editable field
        assert_eq!(updated.total_purchases_cents, 0);

        db.customers().delete(stored.id).await.unwrap();
        assert!(db.customers().get_by_id(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_customer_errors() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ghost = test_customer("Ghost", "555-000-0000");
        ghost.id = 31;

        assert!(matches!(
            db.customers().update(&ghost).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.customers().delete(31).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_many_sorted_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let batch = vec![
            test_customer("Zoe", "555-111-2222"),
            test_customer("Bram", "555-333-4444"),
        ];
        db.customers().insert_many(&batch).await.unwrap();

        let all = db.customers().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Bram");
        assert_eq!(db.customers().count().await.unwrap(), 2);
    }
}
