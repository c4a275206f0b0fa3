//! # selfcounter-catalog: Remote Product Lookup
//!
//! Turns a barcode into a [`Product`](selfcounter_core::Product) by calling
//! the store's catalog service.
//!
//! ## Where It Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartController::begin_lookup ──► LookupTicket                          │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                     ┌───────────────────────────────────┐               │
//! │                     │  ProductLookup::lookup (THIS CRATE)│               │
//! │                     │  POST /api/check-barcode           │               │
//! │                     └──────────────────┬────────────────┘               │
//! │                                        │ CatalogResult<Option<Product>> │
//! │                                        ▼                                │
//! │                               into_outcome(..)                          │
//! │                                        │ LookupOutcome                  │
//! │                                        ▼                                │
//! │  CartController::complete_lookup(ticket, outcome)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`client`] - `CatalogClient` and the `ProductLookup` trait
//! - [`config`] - Base URL and timeout
//! - [`error`] - Transport / decode errors
//! - [`wire`] - JSON request and response shapes
//!
//! ## Usage
//! ```rust,ignore
//! use selfcounter_catalog::{CatalogClient, CatalogConfig, ProductLookup};
//!
//! let client = CatalogClient::new(CatalogConfig::new("http://localhost:5050"))?;
//! match client.lookup("5449000000996").await? {
//!     Some(product) => println!("{} costs {}", product.name, product.price()),
//!     None => println!("not in catalog"),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use client::{into_outcome, CatalogClient, ProductLookup};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};

/// Path of the lookup endpoint, relative to the configured base URL.
pub const CHECK_BARCODE_PATH: &str = "api/check-barcode";
