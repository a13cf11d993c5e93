//! Provider abstraction for product page extraction.
//!
//! This module defines the [`ProductExtractor`] trait, the single seam between
//! the tracker and whatever service scrapes a product page into structured data.
//! Each concrete provider (such as [`firecrawl::FirecrawlProvider`]) handles its
//! vendor-specific request and response shapes.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn ProductExtractor`) for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use chrono::Utc;
//! use product_extractor::{ExtractionError, ProductExtractor, ProductSnapshot};
//!
//! struct FixedPrice;
//!
//! #[async_trait]
//! impl ProductExtractor for FixedPrice {
//!     async fn extract(&self, _url: &str) -> Result<ProductSnapshot, ExtractionError> {
//!         Ok(ProductSnapshot {
//!             name: "Widget".into(),
//!             price: 9.99,
//!             currency: "USD".into(),
//!             main_image_url: None,
//!             observed_at: Utc::now(),
//!         })
//!     }
//! }
//! ```

pub mod errors;
pub mod firecrawl;

use std::time::Duration;

use async_trait::async_trait;
use shared_utils::ConfigError;
use snafu::{Backtrace, Snafu};

use crate::{models::snapshot::ProductSnapshot, providers::errors::ExtractionError};

/// Trait for turning a product URL into a structured snapshot.
#[async_trait]
pub trait ProductExtractor {
    /// Scrapes `url` and returns the product's current name, price, currency and image.
    ///
    /// # Returns
    ///
    /// * `Ok(ProductSnapshot)` - validated data stamped with the observation time.
    /// * `Err(ExtractionError)` - network failure, provider error, or schema mismatch.
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError>;
}

/// Runs `extractor` for `url`, giving up after `timeout`.
///
/// An elapsed timeout is reported as [`ExtractionError::Timeout`] so callers
/// handle it like any other extraction failure.
pub async fn extract_with_timeout(
    extractor: &(dyn ProductExtractor + Send + Sync),
    url: &str,
    timeout: Duration,
) -> Result<ProductSnapshot, ExtractionError> {
    match tokio::time::timeout(timeout, extractor.extract(url)).await {
        Ok(result) => result,
        Err(_) => Err(ExtractionError::Timeout(timeout)),
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing configuration: {source}"))]
    MissingConfig {
        source: ConfigError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    struct Instant;
    struct Stalled;

    #[async_trait]
    impl ProductExtractor for Instant {
        async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
            Ok(ProductSnapshot {
                name: url.to_string(),
                price: 1.0,
                currency: "USD".into(),
                main_image_url: None,
                observed_at: Utc::now(),
            })
        }
    }

    #[async_trait]
    impl ProductExtractor for Stalled {
        async fn extract(&self, _url: &str) -> Result<ProductSnapshot, ExtractionError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ExtractionError::Api("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn timeout_passes_through_fast_results() {
        let extractor: Arc<dyn ProductExtractor + Send + Sync> = Arc::new(Instant);
        let snap = extract_with_timeout(
            extractor.as_ref(),
            "https://a.example/p",
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(snap.name, "https://a.example/p");
    }

    #[tokio::test]
    async fn timeout_is_an_extraction_error() {
        let err = extract_with_timeout(&Stalled, "https://a.example/p", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
