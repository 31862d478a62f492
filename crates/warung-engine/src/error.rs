//! # Engine Error Types
//!
//! The failure taxonomy callers see from checkout, settlement, import and
//! export.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Translation                                    │
//! │                                                                         │
//! │  DbError::StockUnderflow      ──►  InsufficientStock { product_name }  │
//! │  DbError::UniqueViolation     ──►  retried internally; surfaces as     │
//! │   (invoice_number)                 ConcurrentInvoiceNumberConflict     │
//! │                                    only after retries are exhausted    │
//! │  everything else              ──►  passed through as Db(...)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use warung_core::{CoreError, ValidationError};
use warung_db::DbError;

/// Workflow errors surfaced by the engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Checkout was attempted without a customer.
    #[error("No customer selected")]
    NoCustomerSelected,

    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A checkout line exceeded available stock at commit time.
    ///
    /// The storage transaction was rolled back; the cart is intact and the
    /// caller may adjust quantities and retry.
    #[error("Insufficient stock for {product_name}")]
    InsufficientStock { product_name: String },

    /// Invoice number generation kept colliding with concurrent checkouts.
    ///
    /// ## When This Occurs
    /// Only after `INVOICE_NUMBER_MAX_RETRIES` consecutive unique-constraint
    /// hits on `invoice_number`, which requires sustained concurrent
    /// checkout traffic on the same day prefix.
    #[error("Could not allocate a unique invoice number, try again")]
    ConcurrentInvoiceNumberConflict,

    /// The invoice is not in a state that allows the requested transition.
    #[error("Invoice {invoice_id} is {status}, cannot perform operation")]
    InvalidStatusTransition { invoice_id: String, status: String },

    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business rule violation from warung-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure from warung-db.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
