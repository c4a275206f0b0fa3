//! # Domain Types
//!
//! Core domain types used throughout Self Counter.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   WorkingItem   │   │  LookupTicket   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (catalog)   │◄──│  product        │   │  seq (u64)      │       │
//! │  │  barcode        │   │  quantity ≥ 1   │   │  barcode        │       │
//! │  │  name           │   └─────────────────┘   └─────────────────┘       │
//! │  │  price_cents    │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │  LookupStatus   │   │  LookupOutcome  │       │
//! │                        │  ─────────────  │   │  ─────────────  │       │
//! │                        │  Idle           │   │  Found(Product) │       │
//! │                        │  Pending        │   │  NotFound       │       │
//! │                        │  Resolved       │   │  Failed(reason) │       │
//! │                        │  NotFound       │   └─────────────────┘       │
//! │                        │  Failed         │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products come from the remote catalog and are never edited locally.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::MIN_ITEM_QUANTITY;

// =============================================================================
// Product
// =============================================================================

/// A product as resolved by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Catalog identifier (`_id` on the wire).
    pub id: String,

    /// The barcode this product was resolved from.
    pub barcode: String,

    /// Display name shown on the counter.
    pub name: String,

    /// Unit price in minor units.
    pub price_cents: i64,
}

impl Product {
    /// Creates a product from its parts.
    pub fn new(
        id: impl Into<String>,
        barcode: impl Into<String>,
        name: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        Product {
            id: id.into(),
            barcode: barcode.into(),
            name: name.into(),
            price_cents,
        }
    }

    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Working Item
// =============================================================================

/// The product currently under review, before it is committed to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkingItem {
    pub product: Product,

    /// Always at least [`MIN_ITEM_QUANTITY`].
    pub quantity: u32,
}

impl WorkingItem {
    /// Stages a freshly resolved product with quantity 1.
    pub fn new(product: Product) -> Self {
        WorkingItem {
            product,
            quantity: MIN_ITEM_QUANTITY,
        }
    }

    /// Price × quantity for the staged amount.
    pub fn subtotal(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Lookup Lifecycle
// =============================================================================

/// Where the current lookup slot stands.
///
/// ## State Machine
/// ```text
/// ┌──────┐  begin_lookup   ┌─────────┐  Found     ┌──────────┐
/// │ Idle │ ──────────────► │ Pending │ ─────────► │ Resolved │
/// └──────┘                 └────┬────┘            └──────────┘
///     ▲                         │ NotFound / Failed
///     │                         ▼
///     │                  ┌──────────────────┐
///     └──────────────────│ NotFound, Failed │   (working item empty)
///        commit          └──────────────────┘
/// ```
///
/// `Resolved`, `NotFound` and `Failed` are all "idle" for input purposes:
/// a new scan may start at any time, including while `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LookupStatus {
    /// Nothing looked up yet, or the last working item was committed.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The catalog returned a product; it is staged as the working item.
    Resolved,
    /// The catalog has no product for the code.
    NotFound,
    /// The request failed (transport error, timeout, bad body).
    Failed,
}

impl LookupStatus {
    /// True while a request is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, LookupStatus::Pending)
    }
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStatus::Idle => write!(f, "idle"),
            LookupStatus::Pending => write!(f, "pending"),
            LookupStatus::Resolved => write!(f, "resolved"),
            LookupStatus::NotFound => write!(f, "not_found"),
            LookupStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Issued by `begin_lookup`; must be handed back to `complete_lookup`.
///
/// The sequence number is what lets the controller ignore a response that
/// arrives after a newer scan has already been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub barcode: String,
}

/// What a lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Product),
    NotFound,
    /// Transport or server failure, with a reason for the logs.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_item_starts_at_one() {
        let item = WorkingItem::new(Product::new("1", "A1", "Soap", 5000));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.subtotal().cents(), 5000);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product::new("1", "A1", "Soap", 5000);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["priceCents"], 5000);
        assert_eq!(json["barcode"], "A1");
    }

    #[test]
    fn test_lookup_status_display() {
        assert_eq!(LookupStatus::default(), LookupStatus::Idle);
        assert_eq!(LookupStatus::NotFound.to_string(), "not_found");
        assert!(LookupStatus::Pending.is_pending());
        assert!(!LookupStatus::Resolved.is_pending());
    }
}
