//! # Business Rule Validation
//!
//! Field-level validation run before anything is persisted. These checks
//! mirror the database constraints (non-empty names, non-negative amounts)
//! so callers get a typed [`ValidationError`] instead of a storage failure.

use crate::error::ValidationError;
use crate::types::{Customer, Product, ProductDraft};

/// Validates a product before insert or update.
///
/// ## Rules
/// - `name` must be non-blank
/// - `price`, `stock` and `min_stock` must be non-negative
pub fn validate_product(product: &Product) -> Result<(), ValidationError> {
    validate_product_fields(&product.name, product.price, product.stock, product.min_stock)
}

/// Validates an import draft with the same rules as [`validate_product`].
pub fn validate_draft(draft: &ProductDraft) -> Result<(), ValidationError> {
    validate_product_fields(&draft.name, draft.price, draft.stock, draft.min_stock)
}

fn validate_product_fields(
    name: &str,
    price: i64,
    stock: i64,
    min_stock: i64,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if price < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }
    if min_stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "min_stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a customer before insert or update.
pub fn validate_customer(customer: &Customer) -> Result<(), ValidationError> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    Ok(())
}

/// Validates a restock/merge quantity.
pub fn validate_stock_delta(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
