//! Price-drop detection.
//!
//! The baseline for a product is the price of its chronologically earliest
//! history entry, not the most recent one. A new observation alerts when it
//! sits at least `threshold` (a fraction) below that baseline:
//!
//! ```text
//! drop_fraction = (baseline - new) / baseline      only when new < baseline
//! alert         = drop_fraction >= threshold
//! ```
//!
//! Everything here is pure; logging of anomalies is left to the caller.

use std::{fmt, str::FromStr};

use product_extractor::ProductSnapshot;
use thiserror::Error;

use crate::history::PricePoint;

/// Threshold used when none is configured (5%).
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.05;

/// A drop fraction in `[0, 1]` at or above which an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DropThreshold(f64);

/// Rejected threshold values.
#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    /// Not a number, or outside `[0, 1]`.
    #[error("drop threshold must be a fraction in [0, 1], got {0}")]
    OutOfRange(f64),
    /// Not parseable as a number.
    #[error("drop threshold is not a number: {0:?}")]
    NotANumber(String),
}

impl DropThreshold {
    /// Validates `fraction` (e.g. `0.05` for 5%).
    pub fn new(fraction: f64) -> Result<Self, ThresholdError> {
        if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(ThresholdError::OutOfRange(fraction))
        }
    }

    /// The raw fraction.
    pub fn fraction(self) -> f64 {
        self.0
    }
}

impl Default for DropThreshold {
    fn default() -> Self {
        Self(DEFAULT_DROP_THRESHOLD)
    }
}

impl FromStr for DropThreshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s
            .trim()
            .parse::<f64>()
            .map_err(|_| ThresholdError::NotANumber(s.to_string()))?;
        Self::new(v)
    }
}

impl fmt::Display for DropThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data-quality problems that make a comparison meaningless.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Baseline is zero (or, from a corrupt row, negative).
    NonPositiveBaseline {
        /// Stored baseline price.
        baseline: f64,
    },
    /// The product changed currency since its baseline was recorded.
    CurrencyMismatch {
        /// Currency of the baseline entry.
        baseline: String,
        /// Currency of the new observation.
        observed: String,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::NonPositiveBaseline { baseline } => {
                write!(f, "non-positive baseline price {baseline}")
            }
            Anomaly::CurrencyMismatch { baseline, observed } => {
                write!(f, "currency changed from {baseline} to {observed}")
            }
        }
    }
}

/// A drop large enough to alert on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDrop {
    /// Earliest known price.
    pub baseline_price: f64,
    /// Newly observed price.
    pub new_price: f64,
    /// `(baseline - new) / baseline`.
    pub drop_fraction: f64,
}

/// Outcome of comparing one observation with its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// First observation for the product; it becomes the baseline.
    NoBaseline,
    /// Compared, and the drop (if any) is below the threshold.
    NoAlert,
    /// Compared, and the drop meets the threshold.
    Alert(PriceDrop),
    /// Comparison skipped because of a data-quality anomaly.
    Skipped(Anomaly),
}

impl Verdict {
    /// True only for [`Verdict::Alert`].
    pub fn is_alert(&self) -> bool {
        matches!(self, Verdict::Alert(_))
    }
}

/// Relative decrease from `baseline` to `new_price`.
///
/// `None` unless `baseline > 0` and `new_price < baseline`, so there is never a
/// division by zero and a price increase never yields a fraction.
pub fn drop_fraction(baseline: f64, new_price: f64) -> Option<f64> {
    if baseline > 0.0 && new_price < baseline {
        Some((baseline - new_price) / baseline)
    } else {
        None
    }
}

/// Compares two prices in the same currency against `threshold`.
pub fn evaluate(baseline: f64, new_price: f64, threshold: DropThreshold) -> Verdict {
    if baseline <= 0.0 || !baseline.is_finite() {
        return Verdict::Skipped(Anomaly::NonPositiveBaseline { baseline });
    }
    match drop_fraction(baseline, new_price) {
        Some(fraction) if fraction >= threshold.fraction() => Verdict::Alert(PriceDrop {
            baseline_price: baseline,
            new_price,
            drop_fraction: fraction,
        }),
        _ => Verdict::NoAlert,
    }
}

/// Decides whether `observed` should raise an alert given the stored `baseline`.
///
/// Currencies are compared case-insensitively; a mismatch is reported as an
/// anomaly rather than converted.
pub fn detect(
    baseline: Option<&PricePoint>,
    observed: &ProductSnapshot,
    threshold: DropThreshold,
) -> Verdict {
    let Some(baseline) = baseline else {
        return Verdict::NoBaseline;
    };
    if !baseline.currency.trim().eq_ignore_ascii_case(observed.currency.trim()) {
        return Verdict::Skipped(Anomaly::CurrencyMismatch {
            baseline: baseline.currency.clone(),
            observed: observed.currency.clone(),
        });
    }
    evaluate(baseline.price, observed.price, threshold)
}
