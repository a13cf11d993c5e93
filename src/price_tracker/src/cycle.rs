//! Check cycle orchestration.
//!
//! One cycle walks a set of product URLs and, for each one, runs
//! extract → detect → alert → persist in that order. Products are independent
//! and are processed concurrently up to a bounded worker count.
//!
//! Failure policy:
//! - extraction failures (including timeouts) skip the product for this cycle and
//!   leave its history untouched;
//! - alert delivery failures are logged and the snapshot is still persisted;
//! - storage failures abort the whole cycle, since durability can no longer be
//!   guaranteed. Products already committed stay committed.

use std::{fmt, future::Future, num::NonZeroUsize, sync::Arc, time::Duration};

use futures::{StreamExt, stream};
use indexmap::IndexSet;
use product_extractor::{
    ExtractionError, ProductExtractor,
    providers::extract_with_timeout,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    detector::{DropThreshold, Verdict, detect},
    history::{HistoryStore, StoreError},
    notify::{AlertDispatcher, PriceAlert},
};

/// Default number of products checked concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Default bound on a single extraction.
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where in the per-product sequence something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Calling the extraction gateway.
    Extract,
    /// Delivering the alert.
    Dispatch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Extract => "extract",
            Phase::Dispatch => "dispatch",
        })
    }
}

/// Why a single product check did not complete.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The gateway produced no data; the product is skipped this cycle.
    #[error("extraction failed for {url}: {source}")]
    Extraction {
        /// Product URL.
        url: String,
        /// Gateway error.
        source: ExtractionError,
    },
    /// The store failed; fatal for the cycle.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Why a cycle stopped before producing a summary.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// The shutdown signal fired first. Products already recorded stay recorded.
    #[error("check cycle interrupted")]
    Interrupted,
}

/// What happened to an alert for one product.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertStatus {
    /// The verdict did not call for an alert.
    NotNeeded,
    /// Delivered.
    Sent,
    /// Delivery failed with the given reason.
    Failed(String),
}

/// Result of one successful product check.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductOutcome {
    /// Product URL.
    pub url: String,
    /// Product name as observed.
    pub name: String,
    /// Observed price, now persisted.
    pub price: f64,
    /// Currency of `price`.
    pub currency: String,
    /// Detector verdict against the baseline.
    pub verdict: Verdict,
    /// Alert delivery status.
    pub alert: AlertStatus,
}

/// One per-product failure recorded in a [`CycleSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFailure {
    /// Product URL.
    pub url: String,
    /// Phase that failed.
    pub phase: Phase,
    /// Human-readable cause.
    pub reason: String,
}

/// Counts and failures for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSummary {
    /// Products whose new snapshot was persisted.
    pub checked: usize,
    /// Alerts delivered.
    pub alerts_sent: usize,
    /// Alerts that could not be delivered.
    pub alerts_failed: usize,
    /// Products whose detection was skipped because of an anomaly.
    pub anomalies: usize,
    /// Per-product failures, extraction and dispatch.
    pub failures: Vec<CheckFailure>,
}

impl CycleSummary {
    fn record(&mut self, outcome: ProductOutcome) {
        self.checked += 1;
        if matches!(outcome.verdict, Verdict::Skipped(_)) {
            self.anomalies += 1;
        }
        match outcome.alert {
            AlertStatus::NotNeeded => {}
            AlertStatus::Sent => self.alerts_sent += 1,
            AlertStatus::Failed(reason) => {
                self.alerts_failed += 1;
                self.failures.push(CheckFailure {
                    url: outcome.url,
                    phase: Phase::Dispatch,
                    reason,
                });
            }
        }
    }

    /// URLs whose extraction failed this cycle.
    pub fn failed_urls(&self) -> impl Iterator<Item = &str> {
        self.failures
            .iter()
            .filter(|f| f.phase == Phase::Extract)
            .map(|f| f.url.as_str())
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {}, alerts sent {}, alerts failed {}, anomalies {}, failures {}",
            self.checked,
            self.alerts_sent,
            self.alerts_failed,
            self.anomalies,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {} ({}): {}", failure.url, failure.phase, failure.reason)?;
        }
        Ok(())
    }
}

/// Tunables for a [`CheckCycle`].
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Drop fraction that triggers an alert.
    pub threshold: DropThreshold,
    /// Bound on each extraction call.
    pub extract_timeout: Duration,
    /// Maximum products in flight.
    pub workers: NonZeroUsize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            threshold: DropThreshold::default(),
            extract_timeout: DEFAULT_EXTRACT_TIMEOUT,
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Drives extraction, detection, alerting and persistence for a set of products.
pub struct CheckCycle {
    store: HistoryStore,
    extractor: Arc<dyn ProductExtractor + Send + Sync>,
    dispatcher: Arc<dyn AlertDispatcher + Send + Sync>,
    options: CheckOptions,
}

impl CheckCycle {
    /// Wires a cycle from its collaborators.
    pub fn new(
        store: HistoryStore,
        extractor: Arc<dyn ProductExtractor + Send + Sync>,
        dispatcher: Arc<dyn AlertDispatcher + Send + Sync>,
        options: CheckOptions,
    ) -> Self {
        Self {
            store,
            extractor,
            dispatcher,
            options,
        }
    }

    /// The store snapshots are written to.
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Current options.
    pub fn options(&self) -> CheckOptions {
        self.options
    }

    /// Runs the four steps for a single URL.
    pub async fn check_one(&self, url: &str) -> Result<ProductOutcome, CheckError> {
        let timeout = self.options.extract_timeout;
        let snapshot = extract_with_timeout(self.extractor.as_ref(), url, timeout)
            .await
            .map_err(|source| CheckError::Extraction {
                url: url.to_string(),
                source,
            })?;

        let baseline = self.store.earliest_price(url).await?;
        let verdict = detect(baseline.as_ref(), &snapshot, self.options.threshold);

        let alert = match &verdict {
            Verdict::Alert(drop) => {
                let alert = PriceAlert::from_drop(&snapshot.name, url, &snapshot.currency, drop);
                info!(
                    url,
                    baseline = drop.baseline_price,
                    price = drop.new_price,
                    drop_fraction = drop.drop_fraction,
                    "price drop detected"
                );
                match self.dispatcher.dispatch(&alert).await {
                    Ok(()) => AlertStatus::Sent,
                    Err(e) => {
                        warn!(url, phase = %Phase::Dispatch, error = %e, "alert delivery failed");
                        AlertStatus::Failed(e.to_string())
                    }
                }
            }
            Verdict::Skipped(anomaly) => {
                warn!(url, %anomaly, "drop detection skipped");
                AlertStatus::NotNeeded
            }
            Verdict::NoBaseline | Verdict::NoAlert => AlertStatus::NotNeeded,
        };

        let outcome = ProductOutcome {
            url: url.to_string(),
            name: snapshot.name.clone(),
            price: snapshot.price,
            currency: snapshot.currency.clone(),
            verdict,
            alert,
        };

        self.store.record_snapshot(url, snapshot).await?;
        info!(url, price = outcome.price, currency = %outcome.currency, "recorded price");

        Ok(outcome)
    }

    /// Checks every URL once (duplicates collapsed), at most `workers` at a time.
    ///
    /// Returns the summary, or the first storage error, which aborts the cycle.
    pub async fn run<I>(&self, urls: I) -> Result<CycleSummary, StoreError>
    where
        I: IntoIterator<Item = String>,
    {
        let urls: IndexSet<String> = urls.into_iter().collect();
        let workers = self.options.workers.get();
        info!(products = urls.len(), workers, "starting check cycle");

        let mut summary = CycleSummary::default();
        let mut results = stream::iter(urls)
            .map(|url| async move {
                let result = self.check_one(&url).await;
                (url, result)
            })
            .buffer_unordered(workers);

        while let Some((url, result)) = results.next().await {
            match result {
                Ok(outcome) => summary.record(outcome),
                Err(CheckError::Extraction { source, .. }) => {
                    warn!(
                        url = %url,
                        phase = %Phase::Extract,
                        error = %source,
                        "product check failed"
                    );
                    summary.failures.push(CheckFailure {
                        url,
                        phase: Phase::Extract,
                        reason: source.to_string(),
                    });
                }
                Err(CheckError::Storage(e)) => {
                    error!(url = %url, error = %e, "storage failure, aborting check cycle");
                    return Err(e);
                }
            }
        }

        info!(
            checked = summary.checked,
            alerts_sent = summary.alerts_sent,
            alerts_failed = summary.alerts_failed,
            anomalies = summary.anomalies,
            failures = summary.failures.len(),
            "check cycle finished"
        );
        Ok(summary)
    }

    /// Like [`CheckCycle::run`], but gives up as soon as `shutdown` resolves.
    ///
    /// The in-flight cycle is dropped; each product's write is one
    /// transaction, so nothing is left half-written.
    pub async fn run_until<I, S>(&self, urls: I, shutdown: S) -> Result<CycleSummary, CycleError>
    where
        I: IntoIterator<Item = String>,
        S: Future<Output = ()>,
    {
        tokio::select! {
            res = self.run(urls) => Ok(res?),
            () = shutdown => {
                warn!("interrupted, stopping check cycle");
                Err(CycleError::Interrupted)
            }
        }
    }

    /// Variant of [`CheckCycle::run`] over every product known to the store.
    pub async fn run_known_products(&self) -> Result<CycleSummary, StoreError> {
        let products = self.store.list_products().await?;
        self.run(products.into_iter().map(|p| p.url)).await
    }
}
