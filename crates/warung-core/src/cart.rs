//! # Shopping Cart
//!
//! Ephemeral cart state used while a checkout is being assembled.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                    │
//! │                                                                         │
//! │  Caller Action             Cart Method              State Change        │
//! │  ─────────────             ───────────              ────────────        │
//! │                                                                         │
//! │  Pick product ───────────► add_item() ────────────► qty + 1 (clamped)  │
//! │                                                                         │
//! │  Set quantity ───────────► update_quantity() ─────► clamp [0, stock]   │
//! │                                                                         │
//! │  + / - buttons ──────────► increase_quantity() /                        │
//! │                            decrease_quantity() ───► qty ± 1             │
//! │                                                                         │
//! │  Remove line ────────────► remove_item() ─────────► line dropped        │
//! │                                                                         │
//! │  Decrease to 0 ──────────► (same as remove)                             │
//! │                                                                         │
//! │  All operations are in-memory only - nothing touches storage.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft vs hard stock check
//! Quantities are clamped against the stock level observed when the product
//! was added. That is a soft check: the authoritative check is the atomic
//! conditional decrement performed by the stock ledger at commit time.

use serde::{Deserialize, Serialize};

use crate::types::Product;

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart.
///
/// ## Snapshot Pattern
/// Name and price are frozen when the product is added so the cart displays
/// consistent data even if the product is edited mid-checkout. `stock` is
/// the level observed at selection time, used only for clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price in whole rupiah at time of adding (frozen).
    pub unit_price: i64,

    /// Stock level observed when the product was selected (soft limit).
    pub stock: i64,

    /// Quantity in cart. Always in `[1, stock]`.
    pub quantity: i64,
}

impl CartItem {
    /// Creates a cart line from a product snapshot.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            stock: product.stock,
            quantity: quantity.clamp(1, product.stock.max(1)),
        }
    }

    /// Line subtotal: unit price × quantity.
    #[inline]
    pub fn subtotal(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increments
///   its quantity)
/// - Quantity is clamped to `[1, stock]`; updating to 0 removes the line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in the cart, in insertion order.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds one unit of a product, or increments its quantity if already
    /// present. Increments past the observed stock are ignored.
    ///
    /// Products with zero stock are not addable.
    pub fn add_item(&mut self, product: &Product) {
        if product.stock <= 0 {
            return;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            if item.quantity < item.stock {
                item.quantity += 1;
            }
            return;
        }

        self.items.push(CartItem::from_product(product, 1));
    }

    /// Sets the quantity of a line, clamped to `[0, stock]`.
    /// A quantity of 0 removes the line. Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity.min(item.stock);
        }
    }

    /// Increments a line's quantity by one, up to the observed stock.
    pub fn increase_quantity(&mut self, product_id: &str) {
        if let Some(item) = self.items.iter().find(|i| i.product_id == product_id) {
            let next = item.quantity + 1;
            self.update_quantity(product_id, next);
        }
    }

    /// Decrements a line's quantity by one; reaching 0 removes the line.
    pub fn decrease_quantity(&mut self, product_id: &str) {
        if let Some(item) = self.items.iter().find(|i| i.product_id == product_id) {
            let next = item.quantity - 1;
            self.update_quantity(product_id, next);
        }
    }

    /// Removes a line from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line subtotals, in whole rupiah.
    pub fn total_amount(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal()).sum()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
