//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (warung-engine) ← Maps to the checkout/settlement         │
//! │       │                        failure taxonomy                        │
//! │       ▼                                                                 │
//! │  Caller displays user-friendly message                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two variants carry workflow meaning beyond "the query failed":
//! - `UniqueViolation` on `invoices.invoice_number` drives the checkout
//!   engine's regenerate-and-retry loop
//! - `StockUnderflow` reports which product refused a conditional decrement

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU
    /// - Two concurrent checkouts generating the same invoice number
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A delete was blocked because other records still reference the row.
    ///
    /// ## When This Occurs
    /// - Deleting a customer that still has invoices
    /// - Deleting a product referenced by invoice line items
    #[error("{entity} {id} is referenced by other records and cannot be deleted")]
    DeleteRestricted { entity: String, id: String },

    /// A conditional stock decrement found insufficient stock.
    ///
    /// The enclosing transaction is rolled back before this is returned,
    /// so no partial state survives.
    #[error("Insufficient stock for product {product_id}")]
    StockUnderflow { product_id: String },

    /// A stock increment was asked to add a negative quantity.
    ///
    /// Decrements must go through the conditional update, never through a
    /// negative increment that would skip the stock floor check.
    #[error("Stock increment for product {product_id} must not be negative: {quantity}")]
    NegativeStockDelta { product_id: String, quantity: i64 },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DeleteRestricted error.
    pub fn delete_restricted(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::DeleteRestricted {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when the error is a unique-constraint violation, optionally on
    /// a specific column (matched by suffix, e.g. `invoice_number`).
    pub fn is_unique_violation(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field } if field.ends_with(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
