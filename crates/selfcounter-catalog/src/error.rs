//! # Catalog Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidUrl     │  │  Transport      │  │  Decode                 │ │
//! │  │  ClientBuild    │  │  Timeout        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Not found" is not an error: it is `Ok(None)`, whether the service said
//! `product: null` or answered with a non-success status.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Base URL could not be parsed or has an unsupported scheme.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection refused, DNS failure, reset, etc.
    #[error("Catalog request failed: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("Catalog request timed out after {0} ms")]
    Timeout(u64),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// A success response whose body is not the expected shape.
    #[error("Unreadable catalog response: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Whether trying the same request again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Transport(_) | CatalogError::Timeout(_))
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::InvalidUrl(err.to_string())
    }
}
