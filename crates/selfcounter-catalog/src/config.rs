//! # Catalog Configuration
//!
//! Where the catalog lives and how long to wait for it.
//!
//! The base URL is a deployment value (a dev machine on
//! `http://localhost:5050`, a hosted service in production); the terminal
//! app loads it from its config file or `SELFCOUNTER_CATALOG_URL`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CatalogError, CatalogResult};
use crate::CHECK_BARCODE_PATH;

/// Default catalog base URL (local development service).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5050";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`CatalogClient`](crate::CatalogClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Scheme, host and optional path prefix of the catalog service.
    pub base_url: String,

    /// Whole-request timeout. A lookup that exceeds it fails instead of
    /// leaving the counter waiting forever.
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Creates a config for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        CatalogConfig {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builder-style timeout override.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the base URL and timeout.
    ///
    /// ## Rules
    /// - Must parse as an absolute URL
    /// - Scheme must be `http` or `https`
    /// - Timeout must be non-zero
    pub fn validate(&self) -> CatalogResult<()> {
        self.endpoint()?;

        if self.timeout.is_zero() {
            return Err(CatalogError::InvalidUrl(
                "timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Full URL of the lookup endpoint.
    ///
    /// A base with a path prefix keeps it: `https://shop.example/pos`
    /// becomes `https://shop.example/pos/api/check-barcode`.
    pub fn endpoint(&self) -> CatalogResult<Url> {
        let mut base = Url::parse(self.base_url.trim())?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(format!(
                "Catalog URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(base.join(CHECK_BARCODE_PATH)?)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
