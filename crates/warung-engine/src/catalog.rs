//! # Catalog Engine
//!
//! Product and customer maintenance: the create/update/delete paths behind
//! the inventory and customer forms.
//!
//! Every write runs field validation first, so callers get a typed
//! [`ValidationError`](warung_core::ValidationError) instead of a storage
//! constraint failure. Deletes go straight to the repository, which blocks
//! them while invoices still reference the row.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;
use warung_core::validation::{validate_customer, validate_draft, validate_product};
use warung_core::{Customer, Product, ProductDraft};
use warung_db::Database;

// =============================================================================
// Customer Draft
// =============================================================================

/// A customer as entered in a form, before an identity is assigned.
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub photo_path: Option<String>,
}

impl CustomerDraft {
    /// Promotes the draft to a full customer once identity is assigned.
    pub fn into_customer(self, id: String, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            photo_path: self.photo_path,
            created_at,
        }
    }
}

// =============================================================================
// Catalog Engine
// =============================================================================

/// Runs validated product and customer maintenance.
#[derive(Debug, Clone)]
pub struct CatalogEngine {
    db: Database,
}

impl CatalogEngine {
    /// Creates a new catalog engine.
    pub fn new(db: Database) -> Self {
        CatalogEngine { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Validates and inserts a new product.
    pub async fn create_product(&self, draft: ProductDraft) -> EngineResult<Product> {
        validate_draft(&draft)?;

        let product = draft.into_product(Uuid::new_v4().to_string(), Utc::now());
        self.db.products().insert(&product).await?;

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Validates and saves changes to an existing product.
    pub async fn update_product(&self, product: &Product) -> EngineResult<()> {
        validate_product(product)?;
        self.db.products().update(product).await?;

        info!(id = %product.id, "Product updated");
        Ok(())
    }

    /// Deletes a product. Blocked while invoice line items reference it.
    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.db.products().delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Validates and inserts a new customer.
    pub async fn create_customer(&self, draft: CustomerDraft) -> EngineResult<Customer> {
        let customer = draft.into_customer(Uuid::new_v4().to_string(), Utc::now());
        validate_customer(&customer)?;

        self.db.customers().insert(&customer).await?;

        info!(id = %customer.id, name = %customer.name, "Customer created");
        Ok(customer)
    }

    /// Validates and saves changes to an existing customer.
    pub async fn update_customer(&self, customer: &Customer) -> EngineResult<()> {
        validate_customer(customer)?;
        self.db.customers().update(customer).await?;

        info!(id = %customer.id, "Customer updated");
        Ok(())
    }

    /// Deletes a customer. Blocked while invoices reference them.
    pub async fn delete_customer(&self, id: &str) -> EngineResult<()> {
        self.db.customers().delete(id).await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use warung_db::DbConfig;

    async fn test_engine() -> CatalogEngine {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogEngine::new(db)
    }

    fn draft(name: &str, price: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price,
            stock: 10,
            ..ProductDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_product_persists() {
        let engine = test_engine().await;

        let product = engine.create_product(draft("Kopi", 2_500)).await.unwrap();

        let loaded = engine
            .db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Kopi");
        assert_eq!(loaded.stock, 10);
    }

    #[tokio::test]
    async fn test_create_product_blank_name_never_reaches_storage() {
        let engine = test_engine().await;

        let err = engine.create_product(draft("   ", 2_500)).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(engine.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_product_rejects_negative_price() {
        let engine = test_engine().await;
        let mut product = engine.create_product(draft("Kopi", 2_500)).await.unwrap();

        product.price = -1;
        let err = engine.update_product(&product).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let loaded = engine
            .db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.price, 2_500);
    }

    #[tokio::test]
    async fn test_create_customer_requires_name() {
        let engine = test_engine().await;

        let err = engine
            .create_customer(CustomerDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let created = engine
            .create_customer(CustomerDraft {
                name: "Bu Sari".to_string(),
                phone: "0812".to_string(),
                ..CustomerDraft::default()
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Bu Sari");

        let listed = engine.db.customers().list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_update_customer_blank_name_rejected() {
        let engine = test_engine().await;
        let mut customer = engine
            .create_customer(CustomerDraft {
                name: "Bu Sari".to_string(),
                ..CustomerDraft::default()
            })
            .await
            .unwrap();

        customer.name = String::new();
        let err = engine.update_customer(&customer).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
