//! # Recent Scans
//!
//! A short, most-recent-first memory of products the catalog resolved.
//!
//! ```text
//! scan A1 → [A1]
//! scan B2 → [B2, A1]
//! scan A1 → [A1, B2]        re-scan moves to the front, no duplicate
//! scan C3 → [C3, A1]        oldest falls off at capacity
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;
use crate::RECENT_SCAN_CAPACITY;

/// One remembered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecentScan {
    pub product: Product,

    #[ts(as = "String")]
    pub scanned_at: DateTime<Utc>,
}

/// Bounded, barcode-deduplicated history.
///
/// ## Invariants
/// - `len() <= capacity`
/// - no two entries share a barcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentScans {
    entries: Vec<RecentScan>,
    capacity: usize,
}

impl RecentScans {
    /// Creates an empty list holding [`RECENT_SCAN_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(RECENT_SCAN_CAPACITY)
    }

    /// Creates an empty list with a custom capacity (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RecentScans {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a resolved product at the front.
    ///
    /// An existing entry with the same barcode is removed first, so a
    /// re-scan moves rather than duplicates. The list is then truncated.
    pub fn record(&mut self, product: Product, scanned_at: DateTime<Utc>) {
        self.entries.retain(|e| e.product.barcode != product.barcode);
        self.entries.insert(0, RecentScan { product, scanned_at });
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[RecentScan] {
        &self.entries
    }

    /// Barcodes, most recent first.
    pub fn barcodes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.product.barcode.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentScans {
    fn default() -> Self {
        Self::new()
    }
}
