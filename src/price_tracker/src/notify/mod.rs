//! Alert dispatch boundary.
//!
//! Alerts are best-effort: a failed [`AlertDispatcher::dispatch`] is logged by
//! the check cycle and never blocks persisting the observation that caused it.

pub mod discord;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::detector::PriceDrop;

pub use discord::DiscordWebhook;

/// Failure to deliver an alert. Never fatal to the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Transport-level failure.
    #[error("alert request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The receiving endpoint answered with a non-success status.
    #[error("alert endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },
}

/// Message payload for one price drop.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    /// Display name of the product.
    pub product_name: String,
    /// Product page URL.
    pub url: String,
    /// Currency of both prices.
    pub currency: String,
    /// Baseline (earliest known) price.
    pub old_price: f64,
    /// Newly observed price.
    pub new_price: f64,
    /// `(old - new) / old`.
    pub drop_fraction: f64,
}

impl PriceAlert {
    /// Builds the payload from a detected drop.
    pub fn from_drop(product_name: &str, url: &str, currency: &str, drop: &PriceDrop) -> Self {
        Self {
            product_name: product_name.to_string(),
            url: url.to_string(),
            currency: currency.to_string(),
            old_price: drop.baseline_price,
            new_price: drop.new_price,
            drop_fraction: drop.drop_fraction,
        }
    }

    /// Drop as a percentage, e.g. `6.0` for a 6% drop.
    pub fn drop_percent(&self) -> f64 {
        self.drop_fraction * 100.0
    }

    /// Human-readable single-message rendering.
    pub fn message(&self) -> String {
        format!(
            "Price drop: {name} is now {new:.2} {cur} (was {old:.2} {cur}, down {pct:.1}%) {url}",
            name = self.product_name,
            new = self.new_price,
            old = self.old_price,
            cur = self.currency,
            pct = self.drop_percent(),
            url = self.url,
        )
    }
}

/// Delivers price-drop alerts somewhere a human will see them.
#[async_trait]
pub trait AlertDispatcher {
    /// Sends one alert; `Ok` means the receiver acknowledged it.
    async fn dispatch(&self, alert: &PriceAlert) -> Result<(), DispatchError>;
}

/// Writes alerts to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn dispatch(&self, alert: &PriceAlert) -> Result<(), DispatchError> {
        info!(url = %alert.url, drop_fraction = alert.drop_fraction, "{}", alert.message());
        Ok(())
    }
}
