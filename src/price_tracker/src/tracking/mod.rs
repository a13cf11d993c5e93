//! Tracking set management: which product URLs are under active monitoring.
//!
//! The tracking list is independent of price history. Adding a URL runs an
//! initial check so the product starts with a baseline entry; removing a URL
//! also purges its product row and history from the store.
//!
//! Duplicate adds are rejected with [`TrackingError::AlreadyTracked`].

pub mod source;

use std::sync::Arc;

use indexmap::IndexSet;
use product_extractor::ExtractionError;
use reqwest::Url;
use thiserror::Error;
use tracing::info;

use crate::{
    cycle::{CheckCycle, CheckError, ProductOutcome},
    history::{HistoryStore, StoreError},
};

pub use source::{JsonFileSource, SourceError, TableSource, TrackingSource, TrackingSourceSpec};

/// Failures of tracking-set operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Not an absolute URL with a scheme and a host.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// Input as given.
        url: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The URL is already in the tracking set.
    #[error("{0} is already being tracked")]
    AlreadyTracked(String),
    /// The initial check could not extract the product; the URL was not added.
    #[error("initial price check failed: {0}")]
    Extraction(#[source] ExtractionError),
    /// Reading or writing the tracking list failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The history store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CheckError> for TrackingError {
    fn from(e: CheckError) -> Self {
        match e {
            CheckError::Extraction { source, .. } => TrackingError::Extraction(source),
            CheckError::Storage(e) => TrackingError::Store(e),
        }
    }
}

/// Checks that `url` has a scheme and a network location; returns it trimmed.
pub fn validate_url(url: &str) -> Result<String, TrackingError> {
    let trimmed = url.trim();
    let invalid = |reason: String| TrackingError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(invalid("missing network location".to_string())),
    }
}

/// The user-managed, ordered set of tracked URLs.
pub struct TrackingSet {
    source: Arc<dyn TrackingSource>,
}

impl TrackingSet {
    /// Manages the list held by `source`.
    pub fn new(source: Arc<dyn TrackingSource>) -> Self {
        Self { source }
    }

    /// Builds the source named by `spec`.
    pub fn from_spec(spec: &TrackingSourceSpec, store: &HistoryStore) -> Self {
        Self::new(spec.build(store))
    }

    async fn load(&self) -> Result<IndexSet<String>, TrackingError> {
        let source = Arc::clone(&self.source);
        Self::blocking(move || source.load()).await
    }

    async fn save(&self, urls: IndexSet<String>) -> Result<(), TrackingError> {
        let source = Arc::clone(&self.source);
        Self::blocking(move || source.save(&urls)).await
    }

    async fn blocking<T, F>(f: F) -> Result<T, TrackingError>
    where
        F: FnOnce() -> Result<T, SourceError> + Send + 'static,
        T: Send + 'static,
    {
        let res = tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| SourceError::Worker(e.to_string()))?;
        Ok(res?)
    }

    /// Tracked URLs in the order they were added.
    pub async fn list(&self) -> Result<Vec<String>, TrackingError> {
        Ok(self.load().await?.into_iter().collect())
    }

    /// Whether `url` is currently tracked.
    pub async fn contains(&self, url: &str) -> Result<bool, TrackingError> {
        Ok(self.load().await?.contains(url.trim()))
    }

    /// Validates `url`, runs an initial check through `cycle`, then appends it.
    ///
    /// The URL is only added when the initial check stored a snapshot.
    pub async fn add(
        &self,
        url: &str,
        cycle: &CheckCycle,
    ) -> Result<ProductOutcome, TrackingError> {
        let url = validate_url(url)?;
        if self.load().await?.contains(&url) {
            return Err(TrackingError::AlreadyTracked(url));
        }

        let outcome = cycle.check_one(&url).await?;

        // reload: the list may have changed while the check was in flight
        let mut urls = self.load().await?;
        urls.insert(url.clone());
        self.save(urls).await?;

        info!(url = %url, name = %outcome.name, price = outcome.price, "now tracking");
        Ok(outcome)
    }

    /// Untracks `url` and purges its product and history from `store`.
    ///
    /// Returns whether the URL was tracked. Purging is idempotent, so removing
    /// an unknown URL is not an error.
    pub async fn remove(&self, url: &str, store: &HistoryStore) -> Result<bool, TrackingError> {
        let url = url.trim();
        let mut urls = self.load().await?;
        let was_tracked = urls.shift_remove(url);
        if was_tracked {
            self.save(urls).await?;
        }

        let purged = store.remove_product(url).await?;
        info!(url, was_tracked, purged, "removed from tracking");
        Ok(was_tracked)
    }
}
