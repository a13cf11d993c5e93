//! Runtime configuration, read from the process environment.
//!
//! | Variable                | Default         |
//! |-------------------------|-----------------|
//! | `CONNECTION_STRING`     | required (falls back to `DATABASE_URL`) |
//! | `PRICE_DROP_THRESHOLD`  | `0.05`          |
//! | `PRODUCTS_SOURCE`       | `products.json` |
//! | `CHECK_CONCURRENCY`     | `4`             |
//! | `EXTRACT_TIMEOUT_SECS`  | `60`            |
//! | `EXTRACTOR`             | `firecrawl`     |
//! | `DISCORD_WEBHOOK_URL`   | unset (alerts are logged only) |
//!
//! Extractor credentials (`FIRECRAWL_API_KEY`, `FIRECRAWL_API_URL`) are read by
//! the extractor itself when it is built.

use std::{num::NonZeroUsize, time::Duration};

use shared_utils::{
    ConfigError,
    env::{non_blank, parse_or},
};

use crate::{
    cycle::{CheckOptions, DEFAULT_EXTRACT_TIMEOUT, DEFAULT_WORKERS},
    detector::DropThreshold,
    providers::ExtractorId,
    tracking::TrackingSourceSpec,
};

/// Fully resolved settings for one process.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Database URL; only SQLite is supported.
    pub connection_string: String,
    /// Where the tracking list lives.
    pub products_source: TrackingSourceSpec,
    /// Relative drop that triggers an alert.
    pub threshold: DropThreshold,
    /// Maximum products checked concurrently.
    pub workers: NonZeroUsize,
    /// Per-product extraction timeout.
    pub extract_timeout: Duration,
    /// Extraction backend.
    pub extractor: ExtractorId,
    /// Discord webhook for alerts.
    pub discord_webhook_url: Option<String>,
}

impl TrackerConfig {
    /// Reads the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| non_blank(lookup(name));

        let connection_string = get("CONNECTION_STRING")
            .or_else(|| get("DATABASE_URL"))
            .ok_or_else(|| ConfigError::MissingEnvVar("CONNECTION_STRING".to_string()))?;

        let products_source = parse_or(
            "PRODUCTS_SOURCE",
            get("PRODUCTS_SOURCE").as_deref(),
            TrackingSourceSpec::default(),
        )?;
        let threshold = parse_or(
            "PRICE_DROP_THRESHOLD",
            get("PRICE_DROP_THRESHOLD").as_deref(),
            DropThreshold::default(),
        )?;
        let workers = parse_or(
            "CHECK_CONCURRENCY",
            get("CHECK_CONCURRENCY").as_deref(),
            NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
        )?;

        let timeout_raw = get("EXTRACT_TIMEOUT_SECS");
        let secs = parse_or(
            "EXTRACT_TIMEOUT_SECS",
            timeout_raw.as_deref(),
            DEFAULT_EXTRACT_TIMEOUT.as_secs(),
        )?;
        if secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EXTRACT_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let extractor = parse_or("EXTRACTOR", get("EXTRACTOR").as_deref(), ExtractorId::default())?;

        Ok(Self {
            connection_string,
            products_source,
            threshold,
            workers,
            extract_timeout: Duration::from_secs(secs),
            extractor,
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
        })
    }

    /// Cycle options derived from this configuration.
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            threshold: self.threshold,
            extract_timeout: self.extract_timeout,
            workers: self.workers,
        }
    }
}
