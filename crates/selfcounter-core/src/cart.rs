//! # Cart
//!
//! The running cart: one line per distinct product, in the order products
//! were first added.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Controller Call          Cart Change          │
//! │  ───────────────          ───────────────          ───────────          │
//! │                                                                         │
//! │  Add to cart ───────────► commit_working_item() ─► add(product, qty)   │
//! │                                                    (merge or append)   │
//! │                                                                         │
//! │  [+] on a line ─────────► adjust_cart_quantity ──► increment(id)       │
//! │                                                                         │
//! │  [-] on a line ─────────► adjust_cart_quantity ──► decrement(id)       │
//! │                                                    (clamps at 1)       │
//! │                                                                         │
//! │  NOTE: There is no remove. A line, once added, stays until the cart    │
//! │        is cleared for the next customer.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::MIN_ITEM_QUANTITY;

/// A line in the cart.
///
/// ## Design Notes
/// The product fields are a frozen copy taken when the line was created.
/// A later scan of the same product at a different catalog price merges
/// quantity into this line and keeps the original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Catalog identifier; unique within a cart.
    pub product_id: String,

    pub barcode: String,

    pub name: String,

    /// Unit price in minor units at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Always at least [`MIN_ITEM_QUANTITY`].
    pub quantity: u32,

    /// When this line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a cart line from a product and quantity.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        CartLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: quantity.max(MIN_ITEM_QUANTITY),
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - Every quantity is at least 1
/// - Insertion order is display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `quantity` of a product, merging into an existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity grows by `quantity`
    /// - Product not in cart: appended as a new line
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(CartLine::from_product(product, quantity));
    }

    /// Increases a line's quantity by `by`.
    pub fn increment(&mut self, product_id: &str, by: u32) -> CoreResult<u32> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;
        line.quantity = line.quantity.saturating_add(by);
        Ok(line.quantity)
    }

    /// Decreases a line's quantity by `by`, clamping at 1.
    ///
    /// The line is never removed, even when the request would go to zero.
    pub fn decrement(&mut self, product_id: &str, by: u32) -> CoreResult<u32> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;
        line.quantity = line.quantity.saturating_sub(by).max(MIN_ITEM_QUANTITY);
        Ok(line.quantity)
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by product identifier.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity as u64).sum()
    }

    /// Σ unit price × quantity. Recomputed on every call.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
