//! # Catalog Client
//!
//! HTTP client for the barcode lookup endpoint.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Barcode Lookup                                       │
//! │                                                                         │
//! │  lookup("A1")                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST {base}/api/check-barcode  { "barcode": "A1" }                     │
//! │       │                                                                 │
//! │       ├── send failed ────────────────► Err(Transport | Timeout)       │
//! │       ├── status not 2xx ─────────────► Ok(None)                       │
//! │       ├── body not JSON / bad shape ──► Err(Decode)                    │
//! │       ├── product null / missing ─────► Ok(None)                       │
//! │       └── product present ────────────► Ok(Some(Product))             │
//! │                                                                         │
//! │  No retries: a failed lookup is reported and the operator rescans.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use selfcounter_core::{LookupOutcome, Product};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::wire::{CheckBarcodeRequest, CheckBarcodeResponse};

// =============================================================================
// Lookup Trait
// =============================================================================

/// Anything that can resolve a barcode to a product.
///
/// `CatalogClient` is the production implementation; tests and offline
/// demos plug in fakes.
pub trait ProductLookup: Send + Sync {
    /// `Ok(None)` means the catalog has no such product.
    fn lookup(&self, barcode: &str) -> impl Future<Output = CatalogResult<Option<Product>>> + Send;
}

/// Maps a lookup result onto the controller's outcome type.
pub fn into_outcome(result: CatalogResult<Option<Product>>) -> LookupOutcome {
    match result {
        Ok(Some(product)) => LookupOutcome::Found(product),
        Ok(None) => LookupOutcome::NotFound,
        Err(e) => LookupOutcome::Failed(e.to_string()),
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Client for `POST /api/check-barcode`.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_ms: u64,
}

impl CatalogClient {
    /// Creates a client after validating the configuration.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

        info!(endpoint = %endpoint, timeout_ms = config.timeout.as_millis() as u64, "Catalog client ready");

        Ok(CatalogClient {
            http,
            endpoint,
            timeout_ms: config.timeout.as_millis() as u64,
        })
    }

    /// The resolved lookup URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Performs one lookup.
    pub async fn check_barcode(&self, barcode: &str) -> CatalogResult<Option<Product>> {
        let started = Instant::now();
        debug!(barcode, "Looking up barcode");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&CheckBarcodeRequest { barcode })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            info!(barcode, %status, "Catalog answered without success, treating as not found");
            return Ok(None);
        }

        let body: CheckBarcodeResponse = response.json().await.map_err(|e| self.classify(e))?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match body.product {
            Some(doc) => {
                let product = doc.into_product(barcode)?;
                debug!(barcode, product_id = %product.id, elapsed_ms, "Barcode resolved");
                Ok(Some(product))
            }
            None => {
                debug!(barcode, elapsed_ms, "No product for barcode");
                Ok(None)
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            warn!(timeout_ms = self.timeout_ms, "Catalog request timed out");
            CatalogError::Timeout(self.timeout_ms)
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl ProductLookup for CatalogClient {
    async fn lookup(&self, barcode: &str) -> CatalogResult<Option<Product>> {
        self.check_barcode(barcode).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn check_barcode(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        match body["barcode"].as_str() {
            Some("A1") => (
                StatusCode::OK,
                Json(json!({
                    "product": { "_id": "1", "barcode": "A1", "name": "Soap", "price": 50 }
                })),
            ),
            Some("BAD") => (
                StatusCode::OK,
                Json(json!({ "product": { "_id": "9", "name": "Broken" } })),
            ),
            Some("BOOM") => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "database down" })),
            ),
            Some("SLOW") => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                (StatusCode::OK, Json(json!({ "product": null })))
            }
            _ => (StatusCode::OK, Json(json!({ "product": null }))),
        }
    }

    async fn spawn_catalog() -> String {
        let app = Router::new().route("/api/check-barcode", post(check_barcode));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn client() -> CatalogClient {
        let base = spawn_catalog().await;
        CatalogClient::new(CatalogConfig::new(base).timeout(Duration::from_millis(300))).unwrap()
    }

    #[tokio::test]
    async fn test_found_product() {
        let client = client().await;
        let product = client.lookup("A1").await.unwrap().unwrap();

        assert_eq!(product, Product::new("1", "A1", "Soap", 5000));
    }

    #[tokio::test]
    async fn test_null_product_is_not_found() {
        let client = client().await;
        assert!(client.lookup("ZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_not_found() {
        let client = client().await;
        assert!(client.lookup("BOOM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_product_is_decode_error() {
        let client = client().await;
        let err = client.lookup("BAD").await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_slow_catalog_times_out() {
        let client = client().await;
        let err = client.lookup("SLOW").await.unwrap_err();
        assert!(matches!(err, CatalogError::Timeout(300)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CatalogClient::new(CatalogConfig::new(format!("http://{}", addr))).unwrap();
        let err = client.lookup("A1").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_into_outcome() {
        let soap = Product::new("1", "A1", "Soap", 5000);
        assert_eq!(
            into_outcome(Ok(Some(soap.clone()))),
            LookupOutcome::Found(soap)
        );
        assert_eq!(into_outcome(Ok(None)), LookupOutcome::NotFound);
        assert!(matches!(
            into_outcome(Err(CatalogError::Timeout(5))),
            LookupOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = CatalogClient::new(CatalogConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));
    }
}
