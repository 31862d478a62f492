//! # Transaction Engine
//!
//! The checkout state machine: cart assembly through committed invoice.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Lifecycle                                │
//! │                                                                         │
//! │          add_product                checkout()                          │
//! │  Empty ─────────────► Building ─────────────► CheckoutInProgress        │
//! │    ▲                    ▲   ▲                        │                   │
//! │    │ cart emptied       │   │ failure                │ success           │
//! │    └────────────────────┘   │ (cart intact)          ▼                   │
//! │                             └─────────────────── Completed               │
//! │                                                  (cart cleared)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invoice Number Retry
//! Two terminals checking out at the same moment may read the same
//! `last_invoice_number` and generate the same next number. The UNIQUE
//! constraint on `invoice_number` catches the loser, which regenerates from
//! the now-updated sequence and retries, up to
//! [`INVOICE_NUMBER_MAX_RETRIES`] attempts.
//!
//! ## Atomicity
//! The invoice row, every line item, and every stock decrement commit in a
//! single storage transaction. A failed line (insufficient stock) rolls the
//! whole checkout back; the cart is untouched so the operator can adjust
//! quantities and retry.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use warung_core::invoice_number::{date_prefix, next_number};
use warung_core::{Cart, Customer, Invoice, InvoiceItem, InvoiceStatus, INVOICE_NUMBER_MAX_RETRIES};
use warung_db::{Database, DbError};

// =============================================================================
// Checkout State
// =============================================================================

/// Where a transaction currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// No items in the cart.
    Empty,
    /// Cart has items; still editable.
    Building,
    /// Commit in flight; cart is frozen.
    CheckoutInProgress,
    /// Invoice committed; cart has been cleared.
    Completed,
}

// =============================================================================
// Receipt
// =============================================================================

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutReceipt {
    pub invoice_id: String,
    pub invoice_number: String,
    pub total_amount: i64,
    pub item_count: usize,
}

// =============================================================================
// Transaction Engine
// =============================================================================

/// Drives one sale from empty cart to committed invoice.
///
/// One engine instance per terminal/session; the cart is session state,
/// not shared.
#[derive(Debug)]
pub struct TransactionEngine {
    db: Database,
    cart: Cart,
    state: CheckoutState,
}

impl TransactionEngine {
    /// Creates a new transaction engine with an empty cart.
    pub fn new(db: Database) -> Self {
        TransactionEngine {
            db,
            cart: Cart::new(),
            state: CheckoutState::Empty,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Read access to the cart for display.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    // =========================================================================
    // Cart Mutation
    // =========================================================================

    /// Adds one unit of a product to the cart (or increments its line).
    ///
    /// The product is fetched fresh so the frozen name/price and the
    /// observed stock clamp reflect current inventory.
    pub async fn add_product(&mut self, product_id: &str) -> EngineResult<()> {
        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        self.cart.add_item(&product);
        self.sync_state();

        debug!(
            product = %product.name,
            lines = self.cart.line_count(),
            "Product added to cart"
        );
        Ok(())
    }

    /// Sets the quantity of a cart line. 0 removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        self.cart.update_quantity(product_id, quantity);
        self.sync_state();
    }

    /// Removes a line from the cart.
    pub fn remove_product(&mut self, product_id: &str) {
        self.cart.remove_item(product_id);
        self.sync_state();
    }

    /// Empties the cart and resets the state machine.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.state = CheckoutState::Empty;
    }

    fn sync_state(&mut self) {
        self.state = if self.cart.is_empty() {
            CheckoutState::Empty
        } else {
            CheckoutState::Building
        };
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Commits the cart as an invoice for the given customer.
    ///
    /// ## Returns
    /// * `Err(NoCustomerSelected)` - no customer given
    /// * `Err(EmptyCart)` - nothing to sell
    /// * `Err(InsufficientStock)` - a line exceeded available stock; the
    ///   transaction was rolled back and the cart is intact
    /// * `Err(ConcurrentInvoiceNumberConflict)` - number generation kept
    ///   colliding after retries
    pub async fn checkout(
        &mut self,
        customer: Option<&Customer>,
        notes: &str,
    ) -> EngineResult<CheckoutReceipt> {
        let customer = customer.ok_or(EngineError::NoCustomerSelected)?;
        if self.cart.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        self.state = CheckoutState::CheckoutInProgress;

        let result = self.commit_cart(customer, notes).await;

        match &result {
            Ok(receipt) => {
                info!(
                    invoice_number = %receipt.invoice_number,
                    total = receipt.total_amount,
                    customer = %customer.name,
                    "Checkout completed"
                );
                self.cart.clear();
                self.state = CheckoutState::Completed;
            }
            Err(_) => {
                // Recoverable: the operator can edit the cart and retry
                self.state = CheckoutState::Building;
            }
        }

        result
    }

    async fn commit_cart(
        &self,
        customer: &Customer,
        notes: &str,
    ) -> EngineResult<CheckoutReceipt> {
        let invoices = self.db.invoices();
        let now = Utc::now();
        let prefix = date_prefix(now.date_naive());

        for attempt in 1..=INVOICE_NUMBER_MAX_RETRIES {
            let last = invoices.last_invoice_number(&prefix).await?;
            let number = next_number(&prefix, last.as_deref());

            let invoice_id = Uuid::new_v4().to_string();
            let invoice = Invoice {
                id: invoice_id.clone(),
                invoice_number: number.clone(),
                customer_id: customer.id.clone(),
                customer_name: customer.name.clone(),
                total_amount: self.cart.total_amount(),
                date: now,
                status: InvoiceStatus::Pending,
                notes: notes.to_string(),
            };

            let items: Vec<InvoiceItem> = self
                .cart
                .items
                .iter()
                .map(|line| InvoiceItem {
                    id: Uuid::new_v4().to_string(),
                    invoice_id: invoice_id.clone(),
                    product_id: line.product_id.clone(),
                    product_name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal(),
                })
                .collect();

            match invoices.create_with_items(&invoice, &items).await {
                Ok(()) => {
                    return Ok(CheckoutReceipt {
                        invoice_id,
                        invoice_number: number,
                        total_amount: invoice.total_amount,
                        item_count: items.len(),
                    });
                }

                Err(err) if err.is_unique_violation("invoice_number") => {
                    warn!(
                        attempt,
                        number = %number,
                        "Invoice number collided with a concurrent checkout, retrying"
                    );
                    continue;
                }

                Err(DbError::StockUnderflow { product_id }) => {
                    let product_name = self
                        .cart
                        .items
                        .iter()
                        .find(|line| line.product_id == product_id)
                        .map(|line| line.name.clone())
                        .unwrap_or(product_id);
                    return Err(EngineError::InsufficientStock { product_name });
                }

                Err(err) => return Err(err.into()),
            }
        }

        Err(EngineError::ConcurrentInvoiceNumberConflict)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warung_core::Product;
    use warung_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
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

    async fn seed_customer(db: &Database, id: &str, name: &str) -> Customer {
        let customer = Customer {
            id: id.to_string(),
            name: name.to_string(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            photo_path: None,
            created_at: Utc::now(),
        };
        db.customers().insert(&customer).await.unwrap();
        customer
    }

    #[tokio::test]
    async fn test_two_units_checkout_scenario() {
        let db = test_db().await;
        seed_product(&db, "px", "Product X", 10_000, 10).await;
        let jane = seed_customer(&db, "c1", "Jane").await;

        let mut engine = TransactionEngine::new(db.clone());
        engine.add_product("px").await.unwrap();
        engine.add_product("px").await.unwrap();
        assert_eq!(engine.state(), CheckoutState::Building);

        let receipt = engine.checkout(Some(&jane), "").await.unwrap();

        // First invoice of the day gets sequence 001
        let today = date_prefix(Utc::now().date_naive());
        assert_eq!(receipt.invoice_number, format!("INV-{}-001", today));
        assert_eq!(receipt.total_amount, 20_000);
        assert_eq!(receipt.item_count, 1);
        assert_eq!(engine.state(), CheckoutState::Completed);
        assert!(engine.cart().is_empty());

        // Stock decreased by exactly the cart quantity
        let p = db.products().get_by_id("px").await.unwrap().unwrap();
        assert_eq!(p.stock, 8);

        let invoice = db.invoices().get_by_id(&receipt.invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.customer_name, "Jane");
    }

    #[tokio::test]
    async fn test_sequence_increments_within_day() {
        let db = test_db().await;
        seed_product(&db, "p1", "Kopi", 5_000, 100).await;
        let customer = seed_customer(&db, "c1", "Bu Sari").await;

        let mut engine = TransactionEngine::new(db.clone());

        engine.add_product("p1").await.unwrap();
        let first = engine.checkout(Some(&customer), "").await.unwrap();

        engine.add_product("p1").await.unwrap();
        let second = engine.checkout(Some(&customer), "").await.unwrap();

        assert!(first.invoice_number.ends_with("-001"));
        assert!(second.invoice_number.ends_with("-002"));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = test_db().await;
        let customer = seed_customer(&db, "c1", "Bu Sari").await;

        let mut engine = TransactionEngine::new(db);
        let err = engine.checkout(Some(&customer), "").await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyCart));
    }

    #[tokio::test]
    async fn test_no_customer_rejected() {
        let db = test_db().await;
        seed_product(&db, "p1", "Kopi", 5_000, 10).await;

        let mut engine = TransactionEngine::new(db);
        engine.add_product("p1").await.unwrap();

        let err = engine.checkout(None, "").await.unwrap_err();
        assert!(matches!(err, EngineError::NoCustomerSelected));
        // Cart survives the failed attempt
        assert_eq!(engine.cart().line_count(), 1);
    }

    #[tokio::test]
    async fn test_stock_raced_away_is_recoverable() {
        let db = test_db().await;
        seed_product(&db, "p1", "Kopi", 5_000, 2).await;
        let customer = seed_customer(&db, "c1", "Bu Sari").await;

        let mut engine = TransactionEngine::new(db.clone());
        engine.add_product("p1").await.unwrap();
        engine.add_product("p1").await.unwrap();

        // Another terminal sells a unit before this checkout commits
        assert!(db.products().reduce_stock("p1", 1).await.unwrap());

        let err = engine.checkout(Some(&customer), "").await.unwrap_err();
        assert!(
            matches!(err, EngineError::InsufficientStock { ref product_name } if product_name == "Kopi")
        );

        // Rolled back: no invoice, stock unchanged since the race
        assert_eq!(db.invoices().count().await.unwrap(), 0);
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 1);

        // Cart intact, engine back to Building
        assert_eq!(engine.state(), CheckoutState::Building);
        assert_eq!(engine.cart().total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_cart_edits_drive_state() {
        let db = test_db().await;
        seed_product(&db, "p1", "Kopi", 5_000, 10).await;

        let mut engine = TransactionEngine::new(db);
        assert_eq!(engine.state(), CheckoutState::Empty);

        engine.add_product("p1").await.unwrap();
        assert_eq!(engine.state(), CheckoutState::Building);

        engine.update_quantity("p1", 0);
        assert_eq!(engine.state(), CheckoutState::Empty);
    }
}
