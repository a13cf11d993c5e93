use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use shared_utils::env::{get_env_var, get_env_var_opt};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{schema::product_schema, snapshot::ProductSnapshot},
    providers::{
        ClientBuildSnafu, InvalidApiKeySnafu, MissingConfigSnafu, ProductExtractor,
        ProviderInitError,
        errors::ExtractionError,
        firecrawl::{request::ScrapeRequest, response::ScrapeResponse},
    },
};

/// Default public endpoint; self-hosted deployments override it with `FIRECRAWL_API_URL`.
pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

// Upper bound for a single HTTP exchange; the tracker applies its own, usually shorter, timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Extracts products through Firecrawl's scrape endpoint with a JSON-schema extract format.
pub struct FirecrawlProvider {
    client: Client,
    endpoint: String,
    schema: Value,
    _api_key: SecretString,
}

impl FirecrawlProvider {
    /// Creates a new Firecrawl provider.
    ///
    /// Reads the API key from `FIRECRAWL_API_KEY` and an optional base URL
    /// from `FIRECRAWL_API_URL`.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = get_env_var("FIRECRAWL_API_KEY").context(MissingConfigSnafu)?;
        let base_url =
            get_env_var_opt("FIRECRAWL_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_credentials(SecretString::new(api_key.into()), &base_url)
    }

    /// Creates a provider for an explicit key and base URL.
    pub fn with_credentials(
        api_key: SecretString,
        base_url: &str,
    ) -> Result<Self, ProviderInitError> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .context(InvalidApiKeySnafu)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/scrape", base_url.trim_end_matches('/')),
            schema: product_schema(),
            _api_key: api_key,
        })
    }

    /// Full URL of the scrape endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProductExtractor for FirecrawlProvider {
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
        debug!(url, endpoint = %self.endpoint, "requesting extraction");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ScrapeRequest::extract(url, &self.schema))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ExtractionError::Api(format!("{status}: {error_msg}")));
        }

        let scrape = response.json::<ScrapeResponse>().await?;
        if !scrape.success {
            return Err(ExtractionError::Api(
                scrape.error.unwrap_or_else(|| "scrape reported failure".to_string()),
            ));
        }

        let extracted = scrape
            .data
            .and_then(|d| d.extract)
            .ok_or_else(|| ExtractionError::Schema("response has no extract payload".into()))?;

        extracted.into_snapshot(Utc::now())
    }
}
