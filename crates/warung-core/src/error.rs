//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warung-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── RowError         - Per-row failures during bulk import            │
//! │                                                                         │
//! │  warung-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  warung-engine errors (separate crate)                                 │
//! │  └── EngineError      - Workflow failures (wraps all of the above)     │
//! │                                                                         │
//! │  Batch operations never propagate RowError: each one is collected      │
//! │  into the batch result so one bad row cannot abort the rest.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, line number, etc.)
//! 3. Errors are enum variants, never bare Strings
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They should be caught
/// and translated to user-friendly messages by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Insufficient stock to complete a checkout.
    ///
    /// ## When This Occurs
    /// - Stock changed concurrently between cart assembly and commit
    /// - The conditional decrement in the stock ledger refused the update
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout was attempted without selecting a customer.
    #[error("No customer selected")]
    NoCustomerSelected,

    /// An invoice is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Settling a cancelled invoice
    #[error("Invoice {invoice_id} is {current_status}, cannot perform operation")]
    InvalidStatusTransition {
        invoice_id: String,
        current_status: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// CSV rendering failed while building an export.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A field failed numeric parsing. The raw value is kept so the
    /// message can name exactly what was rejected.
    #[error("{field} has invalid number format: '{value}'")]
    InvalidNumber { field: String, value: String },
}

// =============================================================================
// Row Error
// =============================================================================

/// A failure tied to one row of a bulk operation.
///
/// Collected into batch results, never propagated: one bad row must not
/// abort the remainder of an import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {line}: {message}")]
pub struct RowError {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub message: String,
}

impl RowError {
    /// Creates a row error for the given source line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        RowError {
            line,
            message: message.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
