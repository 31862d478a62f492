//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Deletion is blocked while invoices reference the customer. Invoices are
//! the financial record; removing their owner would orphan them.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warung_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, photo_path, created_at";

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

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, email, address, photo_path, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.photo_path)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing customer.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5,
                photo_path = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.photo_path)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = ?1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers ORDER BY name ASC",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Searches customers by name or phone substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", query.trim());

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE name LIKE ?1 OR phone LIKE ?1 ORDER BY name ASC",
            CUSTOMER_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Counts invoices referencing the customer.
    pub async fn invoice_count(&self, id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE customer_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::DeleteRestricted)` - customer still has invoices
    /// * `Err(DbError::NotFound)` - no such customer
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(DbError::not_found("Customer", id)),
            Ok(_) => Ok(()),
            Err(e) => match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    Err(DbError::delete_restricted("Customer", id))
                }
                other => Err(other),
            },
        }
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
