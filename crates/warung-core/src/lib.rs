//! # warung-core: Pure Business Logic for Warung POS
//!
//! This crate is the **heart** of Warung POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Warung POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   warung-engine (workflows)                     │   │
//! │  │    checkout ──► settlement ──► bulk import ──► export           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ warung-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │  import   │  │  export   │  │   │
//! │  │   │  Product  │  │   Cart    │  │ row parse │  │  summary  │  │   │
//! │  │   │  Invoice  │  │ CartItem  │  │ classify  │  │  CSV out  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   warung-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, stock ledger             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, InvoiceItem)
//! - [`cart`] - Ephemeral shopping cart with stock-clamped quantities
//! - [`invoice_number`] - Daily-sequenced invoice number generation
//! - [`import`] - CSV row parsing and duplicate-SKU classification
//! - [`export`] - Export summaries and CSV rendering
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole rupiah (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod export;
pub mod import;
pub mod invoice_number;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use warung_core::Product` instead of
// `use warung_core::types::Product`

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, RowError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default minimum stock threshold for new products.
///
/// A product with `stock <= min_stock` is flagged as low stock. Import rows
/// that leave the MinStock column blank get this value.
pub const DEFAULT_MIN_STOCK: i64 = 5;

/// Minimum number of columns an import row must carry (Name, SKU, Price, Stock).
pub const IMPORT_MIN_COLUMNS: usize = 4;

/// How many times checkout re-reads and regenerates an invoice number after
/// a uniqueness violation before giving up.
pub const INVOICE_NUMBER_MAX_RETRIES: u32 = 3;
