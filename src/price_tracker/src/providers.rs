//! Registry mapping extractor and dispatcher choices to concrete implementations.

use std::{fmt, str::FromStr, sync::Arc};

use product_extractor::{
    ProductExtractor,
    providers::{ProviderInitError, firecrawl::FirecrawlProvider},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notify::{AlertDispatcher, DiscordWebhook, DispatchError, LogDispatcher};

/// Which extraction backend to use (serde snake_case).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorId {
    /// Firecrawl scrape API with a JSON-schema extraction format.
    #[default]
    Firecrawl,
}

/// Unknown extractor name.
#[derive(Debug, Error)]
#[error("unknown extractor {0:?} (expected: firecrawl)")]
pub struct UnknownExtractor(pub String);

impl FromStr for ExtractorId {
    type Err = UnknownExtractor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firecrawl" => Ok(ExtractorId::Firecrawl),
            other => Err(UnknownExtractor(other.to_string())),
        }
    }
}

impl fmt::Display for ExtractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorId::Firecrawl => f.write_str("firecrawl"),
        }
    }
}

/// Build a shared extractor for the supplied id, reading its credentials from the environment.
pub fn build_extractor(
    id: ExtractorId,
) -> Result<Arc<dyn ProductExtractor + Send + Sync>, ProviderInitError> {
    match id {
        ExtractorId::Firecrawl => {
            let p = FirecrawlProvider::new()?;
            Ok(Arc::new(p))
        }
    }
}

/// Discord webhook when a URL is configured, otherwise alerts only go to the log.
pub fn build_dispatcher(
    webhook_url: Option<&str>,
) -> Result<Arc<dyn AlertDispatcher + Send + Sync>, DispatchError> {
    match webhook_url {
        Some(url) => Ok(Arc::new(DiscordWebhook::new(url)?)),
        None => Ok(Arc::new(LogDispatcher)),
    }
}
