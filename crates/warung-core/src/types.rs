//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │  InvoiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  invoice_number │   │  invoice_id     │       │
//! │  │  price          │   │  status         │   │  product_name*  │       │
//! │  │  stock          │   │  total_amount   │   │  unit_price*    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                  * frozen at sale time  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  InvoiceStatus  │   │  ProductDraft   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  Pending        │   │ parsed import   │       │
//! │  │  name, phone    │   │  Paid           │   │ row, no id yet  │       │
//! │  └─────────────────┘   │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where it exists: (sku, invoice_number) - human-readable
//!
//! ## Money
//! All monetary values are whole rupiah stored as `i64`. The currency has
//! no fractional unit, so integer arithmetic is exact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_MIN_STOCK;

// =============================================================================
// Product
// =============================================================================

/// A product in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on invoices and exports.
    pub name: String,

    /// Stock Keeping Unit - optional business identifier.
    /// Empty string means "no SKU"; uniqueness only applies to non-empty values.
    pub sku: String,

    /// Unit price in whole rupiah.
    pub price: i64,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Low-stock threshold. Defaults to [`DEFAULT_MIN_STOCK`].
    pub min_stock: i64,

    /// Optional category label.
    pub category: String,

    /// Optional free-text description.
    pub description: String,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// A product is low on stock when it has fallen to or below its threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Whether the product carries a usable SKU.
    #[inline]
    pub fn has_sku(&self) -> bool {
        !self.sku.trim().is_empty()
    }
}

// =============================================================================
// Product Draft
// =============================================================================

/// A product parsed from an import row, before it has an identity.
///
/// Drafts are classified against existing inventory (by SKU) before being
/// materialized as [`Product`]s or merged into existing stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub price: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub category: String,
    pub description: String,
}

impl ProductDraft {
    /// Whether the draft carries a usable SKU.
    #[inline]
    pub fn has_sku(&self) -> bool {
        !self.sku.trim().is_empty()
    }

    /// Materializes the draft into a product with a fresh identity.
    pub fn into_product(self, id: String, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            sku: self.sku,
            price: self.price,
            stock: self.stock,
            min_stock: self.min_stock,
            category: self.category,
            description: self.description,
            created_at,
        }
    }
}

impl Default for ProductDraft {
    fn default() -> Self {
        ProductDraft {
            name: String::new(),
            sku: String::new(),
            price: 0,
            stock: 0,
            min_stock: DEFAULT_MIN_STOCK,
            category: String::new(),
            description: String::new(),
        }
    }
}

// =============================================================================
// Duplicate Product
// =============================================================================

/// Pairs an import draft with the existing product sharing its SKU.
///
/// Produced by the reconciliation phase of bulk import; the `add_stock`
/// delta is applied only if the caller confirms the stock merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateProduct {
    /// The draft parsed from the import file.
    pub import_draft: ProductDraft,
    /// The product already in inventory with the same SKU.
    pub existing: Product,
    /// Stock quantity the import proposes to add to the existing product.
    pub add_stock: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who can be billed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer name (required).
    pub name: String,

    pub phone: String,
    pub email: String,
    pub address: String,

    /// Path to an optional profile photo, managed by the caller.
    pub photo_path: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// The lifecycle status of an invoice.
///
/// ## Transitions
/// ```text
/// Pending ──settle──► Paid
/// Pending ──cancel──► Cancelled
/// ```
/// Settling a Paid invoice is an idempotent no-op. Settling a Cancelled
/// invoice is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Issued but not yet paid.
    Pending,
    /// Settled in full.
    Paid,
    /// Voided; excluded from settlement.
    Cancelled,
}

impl InvoiceStatus {
    /// Uppercase label used in CSV exports (matches the historical format).
    pub fn export_label(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.export_label())
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An immutable record of a completed checkout.
///
/// `total_amount` equals the sum of the item subtotals at creation time and
/// is never recomputed afterward. `status` is the only field that mutates
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier: `INV-YYYYMMDD-NNN`, unique forever.
    pub invoice_number: String,

    /// Owning customer.
    pub customer_id: String,

    /// Customer name resolved at query time (joined, not stored).
    pub customer_name: String,

    /// Sum of item subtotals, frozen at creation. Whole rupiah.
    pub total_amount: i64,

    /// Creation timestamp.
    pub date: DateTime<Utc>,

    pub status: InvoiceStatus,

    pub notes: String,
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item in an invoice.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,

    /// The sold product. Restricted on delete: a product cannot be removed
    /// while an item references it.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Quantity sold. Always > 0.
    pub quantity: i64,

    /// Unit price in whole rupiah at time of sale (frozen).
    pub unit_price: i64,

    /// quantity × unit_price, frozen.
    pub subtotal: i64,
}

// =============================================================================
// Invoice With Items
// =============================================================================

/// Read model pairing an invoice with its ordered line items.
///
/// Used by export and detail views; never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceWithItems {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
