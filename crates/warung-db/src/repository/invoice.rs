//! # Invoice Repository
//!
//! Invoice persistence, including the transactional checkout commit.
//!
//! ## Checkout Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              create_with_items: one SQLite transaction                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT invoice        ── UNIQUE(invoice_number) may fire here        │
//! │    for each line item:                                                  │
//! │      INSERT invoice_item                                                │
//! │      UPDATE products SET stock = stock - qty                            │
//! │        WHERE id = ? AND stock >= qty                                    │
//! │      rows_affected == 0? ── ROLLBACK, return StockUnderflow             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the invoice, every item, and every decrement persist,           │
//! │  or none of them do.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `UniqueViolation` on `invoice_number` is returned untranslated so the
//! checkout engine can regenerate the number and retry.
//!
//! ## Customer Name
//! Every invoice read JOINs `customers` to fill `customer_name`. The name is
//! never stored on the invoice row.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use warung_core::{Invoice, InvoiceItem, InvoiceStatus, InvoiceWithItems};

const INVOICE_COLUMNS: &str = "i.id, i.invoice_number, i.customer_id, \
     c.name AS customer_name, i.total_amount, i.date, i.status, i.notes";

const ITEM_COLUMNS: &str =
    "id, invoice_id, product_id, product_name, quantity, unit_price, subtotal";

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Sequence Recovery
    // =========================================================================

    /// Returns the highest invoice number issued for a date prefix
    /// (`YYYYMMDD`), or `None` when the day has no invoices yet.
    ///
    /// The sequence widens past 999 (`-999` then `-1000`), so plain
    /// lexicographic MAX would pick `-999` over `-1000`. Ordering by
    /// length first keeps the numeric order across widths.
    pub async fn last_invoice_number(&self, date_prefix: &str) -> DbResult<Option<String>> {
        let pattern = format!("INV-{}-%", date_prefix);

        let number: Option<String> = sqlx::query_scalar(
            "SELECT invoice_number FROM invoices \
             WHERE invoice_number LIKE ?1 \
             ORDER BY LENGTH(invoice_number) DESC, invoice_number DESC LIMIT 1",
        )
        .bind(&pattern)
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    // =========================================================================
    // Checkout Commit
    // =========================================================================

    /// Persists an invoice, its line items, and the matching stock
    /// decrements in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::StockUnderflow)` - a line exceeded available stock;
    ///   the whole transaction was rolled back
    /// * `Err(DbError::UniqueViolation)` - invoice number collided with a
    ///   concurrent checkout; caller regenerates and retries
    pub async fn create_with_items(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
    ) -> DbResult<()> {
        debug!(
            invoice_number = %invoice.invoice_number,
            items = items.len(),
            total = invoice.total_amount,
            "Committing checkout transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_id, total_amount, date, status, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_id)
        .bind(invoice.total_amount)
        .bind(invoice.date)
        .bind(invoice.status)
        .bind(&invoice.notes)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, product_id, product_name,
                    quantity, unit_price, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;

            // Conditional decrement: refuses rather than going negative
            let decremented =
                ProductRepository::reduce_stock_in(&mut *tx, &item.product_id, item.quantity)
                    .await?;

            if !decremented {
                tx.rollback().await?;
                return Err(DbError::StockUnderflow {
                    product_id: item.product_id.clone(),
                });
            }
        }

        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            total = invoice.total_amount,
            "Invoice created"
        );

        Ok(())
    }

    // =========================================================================
    // Status Transitions
    // =========================================================================

    /// Sets the status of an invoice.
    ///
    /// Mechanical write; transition rules (Pending→Paid, no revival of
    /// Cancelled) are enforced by the settlement engine.
    pub async fn update_status(&self, id: &str, status: InvoiceStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating invoice status");

        let result = sqlx::query("UPDATE invoices SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices i \
             JOIN customers c ON c.id = i.customer_id \
             WHERE i.id = ?1",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets an invoice together with its line items, in insertion order.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<InvoiceWithItems>> {
        let Some(invoice) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = self.items_for(id).await?;

        Ok(Some(InvoiceWithItems { invoice, items }))
    }

    /// Gets the line items for one invoice.
    pub async fn items_for(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {} FROM invoice_items WHERE invoice_id = ?1 ORDER BY rowid ASC",
            ITEM_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists all invoices, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices i \
             JOIN customers c ON c.id = i.customer_id \
             ORDER BY i.date DESC",
            INVOICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists invoices with the given status, newest first.
    pub async fn list_by_status(&self, status: InvoiceStatus) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices i \
             JOIN customers c ON c.id = i.customer_id \
             WHERE i.status = ?1 \
             ORDER BY i.date DESC",
            INVOICE_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists invoices for one customer, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices i \
             JOIN customers c ON c.id = i.customer_id \
             WHERE i.customer_id = ?1 \
             ORDER BY i.date DESC",
            INVOICE_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists invoices in a date window, optionally filtered by status.
    ///
    /// The window is inclusive on both ends. Used by export.
    pub async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<InvoiceStatus>,
    ) -> DbResult<Vec<Invoice>> {
        let invoices = match status {
            Some(status) => {
                sqlx::query_as::<_, Invoice>(&format!(
                    "SELECT {} FROM invoices i \
                     JOIN customers c ON c.id = i.customer_id \
                     WHERE i.date >= ?1 AND i.date <= ?2 AND i.status = ?3 \
                     ORDER BY i.date ASC",
                    INVOICE_COLUMNS
                ))
                .bind(start)
                .bind(end)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Invoice>(&format!(
                    "SELECT {} FROM invoices i \
                     JOIN customers c ON c.id = i.customer_id \
                     WHERE i.date >= ?1 AND i.date <= ?2 \
                     ORDER BY i.date ASC",
                    INVOICE_COLUMNS
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(invoices)
    }

    /// Deletes an invoice and its line items (CASCADE).
    ///
    /// Stock is not restored; voiding a sale is a status change, not a
    /// delete.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting invoice");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Counts all invoices (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new invoice ID.
pub fn generate_invoice_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new invoice item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use warung_core::{Customer, Product};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, id: &str, name: &str) {
        db.customers()
            .insert(&Customer {
                id: id.to_string(),
                name: name.to_string(),
                phone: String::new(),
                email: String::new(),
                address: String::new(),
                photo_path: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    async fn seed_product(db: &Database, id: &str, name: &str, price: i64, stock: i64) {
        db.products()
            .insert(&Product {
                id: id.to_string(),
                name: name.to_string(),
                sku: String::new(),
                price,
                stock,
                min_stock: 5,
                category: String::new(),
                description: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn invoice(number: &str, customer_id: &str, total: i64) -> Invoice {
        Invoice {
            id: generate_invoice_id(),
            invoice_number: number.to_string(),
            customer_id: customer_id.to_string(),
            customer_name: String::new(),
            total_amount: total,
            date: Utc::now(),
            status: InvoiceStatus::Pending,
            notes: String::new(),
        }
    }

    fn item(invoice_id: &str, product_id: &str, name: &str, qty: i64, price: i64) -> InvoiceItem {
        InvoiceItem {
            id: generate_item_id(),
            invoice_id: invoice_id.to_string(),
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity: qty,
            unit_price: price,
            subtotal: qty * price,
        }
    }

    #[tokio::test]
    async fn test_create_with_items_commits_everything() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        seed_product(&db, "p1", "Kopi", 10_000, 10).await;

        let inv = invoice("INV-20260113-001", "c1", 20_000);
        let items = vec![item(&inv.id, "p1", "Kopi", 2, 10_000)];

        db.invoices().create_with_items(&inv, &items).await.unwrap();

        let loaded = db.invoices().get_with_items(&inv.id).await.unwrap().unwrap();
        assert_eq!(loaded.invoice.invoice_number, "INV-20260113-001");
        assert_eq!(loaded.invoice.customer_name, "Bu Sari");
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].subtotal, 20_000);

        // Stock was decremented in the same transaction
        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 8);
    }

    #[tokio::test]
    async fn test_underflow_rolls_back_whole_checkout() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        seed_product(&db, "p1", "Kopi", 10_000, 10).await;
        seed_product(&db, "p2", "Gula", 5_000, 1).await;

        let inv = invoice("INV-20260113-001", "c1", 30_000);
        let items = vec![
            item(&inv.id, "p1", "Kopi", 2, 10_000),
            item(&inv.id, "p2", "Gula", 2, 5_000), // only 1 in stock
        ];

        let err = db.invoices().create_with_items(&inv, &items).await.unwrap_err();
        assert!(matches!(err, DbError::StockUnderflow { ref product_id } if product_id == "p2"));

        // Nothing persisted: no invoice, first line's decrement undone
        assert_eq!(db.invoices().count().await.unwrap(), 0);
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 10);
        assert_eq!(db.products().get_by_id("p2").await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_is_unique_violation() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;

        db.invoices()
            .create_with_items(&invoice("INV-20260113-001", "c1", 0), &[])
            .await
            .unwrap();

        let err = db
            .invoices()
            .create_with_items(&invoice("INV-20260113-001", "c1", 0), &[])
            .await
            .unwrap_err();

        assert!(err.is_unique_violation("invoice_number"));
    }

    #[tokio::test]
    async fn test_last_invoice_number_per_day() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        let repo = db.invoices();

        assert_eq!(repo.last_invoice_number("20260113").await.unwrap(), None);

        repo.create_with_items(&invoice("INV-20260113-001", "c1", 0), &[])
            .await
            .unwrap();
        repo.create_with_items(&invoice("INV-20260113-002", "c1", 0), &[])
            .await
            .unwrap();
        repo.create_with_items(&invoice("INV-20260112-009", "c1", 0), &[])
            .await
            .unwrap();

        assert_eq!(
            repo.last_invoice_number("20260113").await.unwrap(),
            Some("INV-20260113-002".to_string())
        );
    }

    #[tokio::test]
    async fn test_last_invoice_number_past_three_digits() {
        // Once the day's sequence widens to four digits, "-1000" must win
        // over "-999" even though it sorts lower lexicographically.
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        let repo = db.invoices();

        repo.create_with_items(&invoice("INV-20260113-999", "c1", 0), &[])
            .await
            .unwrap();
        repo.create_with_items(&invoice("INV-20260113-1000", "c1", 0), &[])
            .await
            .unwrap();

        let last = repo.last_invoice_number("20260113").await.unwrap();
        assert_eq!(last, Some("INV-20260113-1000".to_string()));
        assert_eq!(
            warung_core::invoice_number::next_number("20260113", last.as_deref()),
            "INV-20260113-1001"
        );
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        let repo = db.invoices();

        let inv = invoice("INV-20260113-001", "c1", 0);
        repo.create_with_items(&inv, &[]).await.unwrap();

        repo.update_status(&inv.id, InvoiceStatus::Paid).await.unwrap();
        let loaded = repo.get_by_id(&inv.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, InvoiceStatus::Paid);

        let err = repo.update_status("missing", InvoiceStatus::Paid).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        let repo = db.invoices();

        let a = invoice("INV-20260113-001", "c1", 0);
        let b = invoice("INV-20260113-002", "c1", 0);
        repo.create_with_items(&a, &[]).await.unwrap();
        repo.create_with_items(&b, &[]).await.unwrap();
        repo.update_status(&a.id, InvoiceStatus::Paid).await.unwrap();

        let pending = repo.list_by_status(InvoiceStatus::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
    }

    #[tokio::test]
    async fn test_delete_cascades_items_and_keeps_stock() {
        let db = test_db().await;
        seed_customer(&db, "c1", "Bu Sari").await;
        seed_product(&db, "p1", "Kopi", 10_000, 10).await;
        let repo = db.invoices();

        let inv = invoice("INV-20260113-001", "c1", 10_000);
        let items = vec![item(&inv.id, "p1", "Kopi", 1, 10_000)];
        repo.create_with_items(&inv, &items).await.unwrap();

        repo.delete(&inv.id).await.unwrap();

        assert!(repo.get_by_id(&inv.id).await.unwrap().is_none());
        assert!(repo.items_for(&inv.id).await.unwrap().is_empty());
        // Deleting the record does not restock
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 9);
    }
}
