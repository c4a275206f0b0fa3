//! # selfcounter-core: Pure Business Logic for Self Counter
//!
//! This crate is the **heart** of Self Counter. It owns the scan-to-cart
//! state machine and every piece of arithmetic behind the running total,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Self Counter Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────┐              ┌──────────────────────────┐    │
//! │  │  selfcounter-scanner │   barcode    │   selfcounter-catalog    │    │
//! │  │  capture + decode    │──────┐       │   POST /api/check-barcode│    │
//! │  └──────────────────────┘      │       └────────────┬─────────────┘    │
//! │                                ▼                    │ Product          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             ★ selfcounter-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ controller │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  lookups   │  │   │
//! │  │   │  Working  │  │           │  │  CartLine │  │  observers │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO DEVICES • PURE TRANSITIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ Snapshot                               │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Renderer (terminal / browser)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, WorkingItem, lookup status)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart and its lines
//! - [`recent`] - The bounded recent-scan list
//! - [`controller`] - The cart controller state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Identifier validation
//!
//! ## Example Usage
//!
//! ```rust
//! use selfcounter_core::{CartController, LookupOutcome, Product};
//!
//! let mut controller = CartController::new();
//! let ticket = controller.begin_lookup("A1").unwrap();
//!
//! let soap = Product::new("1", "A1", "Soap", 5000);
//! controller.complete_lookup(&ticket, LookupOutcome::Found(soap));
//! controller.commit_working_item().unwrap();
//!
//! assert_eq!(controller.total().cents(), 5000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod controller;
pub mod error;
pub mod money;
pub mod recent;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use controller::{
    Applied, CartController, NoOpObserver, Snapshot, StateObserver, SubscriptionId,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use recent::{RecentScan, RecentScans};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How many recently resolved products the counter remembers.
pub const RECENT_SCAN_CAPACITY: usize = 2;

/// The smallest quantity a working item or cart line may hold.
pub const MIN_ITEM_QUANTITY: u32 = 1;

/// Longest identifier accepted from a scanner or the manual entry field.
///
/// Real symbologies top out well below this (GS1-128 allows 48 data
/// characters); anything longer is a stuck key or a pasted paragraph.
pub const MAX_IDENTIFIER_LEN: usize = 128;
