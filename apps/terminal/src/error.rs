//! # Application Error Type
//!
//! Unified error type for the terminal front-end.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Self Counter                           │
//! │                                                                         │
//! │  Startup                                                                │
//! │  ───────                                                                │
//! │  config file / env / flags ── ConfigLoadFailed, InvalidConfig ──► exit  │
//! │                                                                         │
//! │  Running                                                                │
//! │  ───────                                                                │
//! │  typed command ── InvalidInput ──────────┐                              │
//! │  cart mutation ── CoreError ─────────────┼──► notice line, keep going   │
//! │  torch / scanner ─ ScannerError ─────────┘                              │
//! │                                                                         │
//! │  lookup ── CatalogError ──► Failed transition (never an AppError)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use selfcounter_catalog::CatalogError;
use selfcounter_core::{CoreError, ValidationError};
use selfcounter_scanner::ScannerError;

/// Result type alias for the application.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Config values are present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// A typed command could not be understood.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Scanner(#[from] ScannerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl AppError {
    /// Creates an input error.
    pub fn input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::ConfigLoadFailed(_)
                | AppError::InvalidConfig(_)
                | AppError::Catalog(CatalogError::InvalidUrl(_) | CatalogError::ClientBuild(_))
        )
    }

    /// The line shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Core(CoreError::NoWorkingItem) => "Scan an item first".to_string(),
            AppError::Core(CoreError::QuantityBelowMinimum { min }) => {
                format!("Quantity cannot go below {}", min)
            }
            AppError::Core(CoreError::LineNotFound(_)) => "No such cart line".to_string(),
            AppError::Core(CoreError::Validation(ValidationError::Required { .. })) => {
                "Enter a barcode".to_string()
            }
            AppError::Core(CoreError::Validation(e)) => e.to_string(),
            AppError::Scanner(ScannerError::TorchUnsupported) => "Torch not supported".to_string(),
            other => other.to_string(),
        }
    }
}
