//! # Validation Module
//!
//! Input validation for identifiers entering the controller.
//!
//! Codes arrive from two places: a scanner (already clean, but may carry a
//! trailing CR/LF or a stray space) and the manual entry field (anything a
//! person can type). Both go through [`normalize_identifier`] before a
//! lookup is issued.
//!
//! ## Usage
//! ```rust
//! use selfcounter_core::validation::normalize_identifier;
//!
//! assert_eq!(normalize_identifier("  5449000000996\r\n").unwrap(), "5449000000996");
//! assert!(normalize_identifier("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_IDENTIFIER_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trims and checks a barcode or manually typed identifier.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_IDENTIFIER_LEN`] characters
/// - No control characters inside the code
///
/// Anything else is passed through verbatim; the catalog decides what
/// exists.
pub fn normalize_identifier(raw: &str) -> ValidationResult<String> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if code.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    if code.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Checks whether a code looks like a retail barcode (EAN-8, UPC-A, EAN-13).
///
/// Used only for log context; the lookup is issued either way.
pub fn looks_like_retail_barcode(code: &str) -> bool {
    matches!(code.len(), 8 | 12 | 13) && code.chars().all(|c| c.is_ascii_digit())
}
