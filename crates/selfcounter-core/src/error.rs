//! # Error Types
//!
//! Domain-specific error types for selfcounter-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  selfcounter-core errors (this file)                                   │
//! │  ├── CoreError        - Rejected cart/controller transitions           │
//! │  └── ValidationError  - Identifier input failures                      │
//! │                                                                         │
//! │  selfcounter-catalog  └── CatalogError  - Lookup transport failures    │
//! │  selfcounter-scanner  └── ScannerError  - Capture / decode failures    │
//! │  apps/terminal        └── AppError      - What the operator sees       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal to a running counter. A rejected transition
//! leaves state exactly as it was.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart controller errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An operation needed a staged product but none is staged.
    ///
    /// ## When This Occurs
    /// - "Add to cart" pressed before any scan resolved
    /// - Quantity buttons pressed after the previous item was committed
    /// - The last lookup came back empty or failed
    #[error("No product is staged; scan an item first")]
    NoWorkingItem,

    /// Decrementing would take a working item below one unit.
    #[error("Quantity cannot go below {min}")]
    QuantityBelowMinimum { min: u32 },

    /// The cart has no line for this product identifier.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. embedded control characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
