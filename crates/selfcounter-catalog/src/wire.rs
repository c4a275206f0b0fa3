//! # Wire Format
//!
//! JSON shapes exchanged with `POST /api/check-barcode`.
//!
//! ```json
//! // request
//! { "barcode": "A1" }
//!
//! // response (found)
//! { "product": { "_id": "65f0c2...", "barcode": "A1", "name": "Soap", "price": 50 } }
//!
//! // response (not found)
//! { "product": null }
//! ```
//!
//! The service is document-store backed, so `_id` may arrive as a string or
//! a number and extra fields (stock, category, timestamps) are common. Only
//! the four fields the counter uses are read.

use serde::{Deserialize, Serialize};

use selfcounter_core::Product;

use crate::error::{CatalogError, CatalogResult};

/// Request body.
#[derive(Debug, Serialize)]
pub struct CheckBarcodeRequest<'a> {
    pub barcode: &'a str,
}

/// Response body. A missing `product` key means the same as `null`.
#[derive(Debug, Deserialize)]
pub struct CheckBarcodeResponse {
    #[serde(default)]
    pub product: Option<CatalogProduct>,
}

/// A product document as the catalog sends it.
#[derive(Debug, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "_id")]
    pub id: CatalogId,

    #[serde(default)]
    pub barcode: Option<String>,

    pub name: String,

    pub price: CatalogPrice,
}

/// `_id` as either a string or a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Text(String),
    Number(serde_json::Number),
}

impl CatalogId {
    fn into_string(self) -> String {
        match self {
            CatalogId::Text(s) => s,
            CatalogId::Number(n) => n.to_string(),
        }
    }
}

/// `price` in major units, as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogPrice {
    Number(f64),
    Text(String),
}

impl CatalogPrice {
    /// Converts to minor units, rounding to the nearest one.
    ///
    /// This is the only place a floating-point amount is touched.
    pub fn to_cents(&self) -> CatalogResult<i64> {
        let major = match self {
            CatalogPrice::Number(n) => *n,
            CatalogPrice::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                CatalogError::Decode(format!("price is not a number: {:?}", s))
            })?,
        };

        let cents = (major * 100.0).round();
        if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
            return Err(CatalogError::Decode(format!("price out of range: {}", major)));
        }
        Ok(cents as i64)
    }
}

impl CatalogProduct {
    /// Converts into the core product type.
    ///
    /// Falls back to the barcode that was asked for when the document does
    /// not echo one back.
    pub fn into_product(self, requested_barcode: &str) -> CatalogResult<Product> {
        let price_cents = self.price.to_cents()?;
        let barcode = self
            .barcode
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| requested_barcode.to_string());

        Ok(Product::new(self.id.into_string(), barcode, self.name, price_cents))
    }
}
