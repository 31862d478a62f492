//! # Product Repository & Stock Ledger
//!
//! Database operations for products, including the atomic stock ledger.
//!
//! ## Stock Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-then-write (lost updates under concurrent checkouts)   │
//! │     let p = get(id);  if p.stock >= qty { set stock = p.stock - qty }  │
//! │                                                                         │
//! │  ✅ CORRECT: single conditional update (compare-and-decrement)         │
//! │     UPDATE products SET stock = stock - ?2                             │
//! │     WHERE id = ?1 AND stock >= ?2                                      │
//! │                                                                         │
//! │  rows_affected == 1  →  decrement happened                             │
//! │  rows_affected == 0  →  insufficient stock, nothing changed            │
//! │                                                                         │
//! │  Two checkouts racing over the last unit: exactly one wins.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warung_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, sku, price, stock, min_stock, category, description, created_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - non-empty SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, price, stock, min_stock,
                category, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (all editable fields, including stock).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                price = ?4,
                stock = ?5,
                min_stock = ?6,
                category = ?7,
                description = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category)
        .bind(&product.description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU (non-empty SKUs only make sense here).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE sku = ?1 AND sku != '' LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets all products whose SKU is in the given set.
    ///
    /// One batch query; used by bulk import reconciliation to classify
    /// every parsed row in a single round trip.
    pub async fn get_by_skus(&self, skus: &[String]) -> DbResult<Vec<Product>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }

        // Build the IN (?, ?, ...) placeholder list at runtime
        let placeholders = vec!["?"; skus.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM products WHERE sku != '' AND sku IN ({}) ORDER BY sku",
            PRODUCT_COLUMNS, placeholders
        );

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for sku in skus {
            query = query.bind(sku);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Lists all products, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products at or below their low-stock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE stock <= min_stock ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name or SKU substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let pattern = format!("%{}%", query.trim());

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE name LIKE ?1 OR sku LIKE ?1 ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists distinct non-empty categories.
    pub async fn list_categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE category != '' ORDER BY category ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    // Stock Ledger
    // =========================================================================

    /// Atomically decrements stock, only if enough is available.
    ///
    /// Single conditional UPDATE (compare-and-decrement), never
    /// read-then-write, so concurrent checkouts cannot oversell.
    ///
    /// ## Returns
    /// * `Ok(true)` - stock was decremented
    /// * `Ok(false)` - insufficient stock; nothing changed
    pub async fn reduce_stock(&self, product_id: &str, quantity: i64) -> DbResult<bool> {
        debug!(id = %product_id, quantity = %quantity, "Reducing stock");
        Self::reduce_stock_in(&self.pool, product_id, quantity).await
    }

    /// The compare-and-decrement statement, runnable on any executor.
    ///
    /// Checkout calls this inside its invoice transaction so the decrement
    /// commits or rolls back together with the invoice rows.
    pub async fn reduce_stock_in<'e, E>(
        executor: E,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<bool>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Atomically increments stock.
    ///
    /// Negative quantities are rejected: a decrement smuggled through here
    /// would bypass the conditional update and its stock floor.
    pub async fn increase_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        if quantity < 0 {
            return Err(DbError::NegativeStockDelta {
                product_id: product_id.to_string(),
                quantity,
            });
        }

        debug!(id = %product_id, quantity = %quantity, "Increasing stock");

        let result = sqlx::query("UPDATE products SET stock = stock + ?2 WHERE id = ?1")
            .bind(product_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Deletes a product.
    ///
    /// Blocked while invoice line items reference the product (RESTRICT):
    /// sold products stay on record forever.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(DbError::not_found("Product", id)),
            Ok(_) => Ok(()),
            Err(e) => match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    Err(DbError::delete_restricted("Product", id))
                }
                other => Err(other),
            },
        }
    }

    /// Counts all products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn product(name: &str, sku: &str, stock: i64) -> Product {
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            sku: sku.to_string(),
            price: 10_000,
            stock,
            min_stock: 5,
            category: String::new(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Kopi", "KOP-01", 10);
        repo.insert(&p).await.unwrap();

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Kopi");
        assert_eq!(loaded.stock, 10);

        let by_sku = repo.get_by_sku("KOP-01").await.unwrap().unwrap();
        assert_eq!(by_sku.id, p.id);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("Kopi", "KOP-01", 10)).await.unwrap();
        let err = repo.insert(&product("Kopi 2", "KOP-01", 5)).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_empty_sku_is_not_unique() {
        let db = test_db().await;
        let repo = db.products();

        // Multiple products without SKU must coexist
        repo.insert(&product("A", "", 1)).await.unwrap();
        repo.insert(&product("B", "", 1)).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_by_skus_batch() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("A", "SKU-A", 1)).await.unwrap();
        repo.insert(&product("B", "SKU-B", 1)).await.unwrap();
        repo.insert(&product("C", "SKU-C", 1)).await.unwrap();

        let found = repo
            .get_by_skus(&["SKU-A".to_string(), "SKU-C".to_string(), "SKU-Z".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.sku == "SKU-A" || p.sku == "SKU-C"));
    }

    #[tokio::test]
    async fn test_reduce_stock_conditional() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Kopi", "KOP-01", 5);
        repo.insert(&p).await.unwrap();

        assert!(repo.reduce_stock(&p.id, 3).await.unwrap());
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 2);

        // Requesting more than remains must refuse and change nothing
        assert!(!repo.reduce_stock(&p.id, 3).await.unwrap());
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_concurrent_reduce_never_oversells() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Last Units", "LAST-01", 5);
        repo.insert(&p).await.unwrap();

        // 10 concurrent single-unit decrements against stock of 5
        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = db.products();
            let id = p.id.clone();
            handles.push(tokio::spawn(async move { repo.reduce_stock(&id, 1).await }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 5);
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_increase_stock() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Kopi", "KOP-01", 5);
        repo.insert(&p).await.unwrap();

        repo.increase_stock(&p.id, 7).await.unwrap();
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 12);

        let err = repo.increase_stock("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_increase_stock_rejects_negative_quantity() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Kopi", "KOP-01", 5);
        repo.insert(&p).await.unwrap();

        let err = repo.increase_stock(&p.id, -3).await.unwrap_err();
        assert!(matches!(err, DbError::NegativeStockDelta { quantity: -3, .. }));

        // Stock untouched: the decrement path with its floor check is the
        // only way down.
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let repo = db.products();

        let mut low = product("Low", "L-01", 5);
        low.min_stock = 5;
        let mut ok = product("Ok", "O-01", 20);
        ok.min_stock = 5;

        repo.insert(&low).await.unwrap();
        repo.insert(&ok).await.unwrap();

        let listed = repo.list_low_stock().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Low");
    }

    #[tokio::test]
    async fn test_search_by_name_or_sku() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("Kopi Sachet", "KOP-01", 1)).await.unwrap();
        repo.insert(&product("Gula", "GUL-01", 1)).await.unwrap();

        assert_eq!(repo.search("kop").await.unwrap().len(), 1);
        assert_eq!(repo.search("GUL").await.unwrap().len(), 1);
        assert_eq!(repo.search("").await.unwrap().len(), 2);
    }
}
