//! # warung-engine: Workflow Orchestration for Warung POS
//!
//! This crate drives the business workflows of the Warung POS system on
//! top of warung-core (pure rules) and warung-db (persistence).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Warung POS Workflows                               │
//! │                                                                         │
//! │  Caller (UI / API / scripts)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   warung-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  TransactionEngine    cart → invoice, number retry, atomicity  │   │
//! │  │  SettlementEngine     Pending → Paid, single + bulk             │   │
//! │  │  BulkImportReconciler two-phase CSV import                      │   │
//! │  │  ExportEngine         invoice/inventory CSV assembly            │   │
//! │  │  CatalogEngine        validated product/customer maintenance    │   │
//! │  │  BatchControl         progress + cancellation plumbing          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  warung-core (pure logic)        warung-db (SQLite)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//! use warung_engine::TransactionEngine;
//!
//! let db = Database::new(DbConfig::new("./warung.db")).await?;
//!
//! let mut checkout = TransactionEngine::new(db.clone());
//! checkout.add_product(&product_id).await?;
//! let receipt = checkout.checkout(Some(&customer), "").await?;
//! println!("sold: {}", receipt.invoice_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod export;
pub mod import;
pub mod settlement;

// =============================================================================
// Re-exports
// =============================================================================

pub use batch::{BatchControl, BatchProgress};
pub use catalog::{CatalogEngine, CustomerDraft};
pub use checkout::{CheckoutReceipt, CheckoutState, TransactionEngine};
pub use error::{EngineError, EngineResult};
pub use export::{ExportEngine, ExportPreview};
pub use import::{BulkImportReconciler, ImportOutcome, ImportPlan};
pub use settlement::{BatchOutcome, SettlementEngine};
