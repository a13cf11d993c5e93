use std::time::Duration;

use thiserror::Error;

/// Errors that can occur within a [`ProductExtractor`](crate::providers::ProductExtractor) implementation.
///
/// Every variant means the same thing to callers: no structured data could be
/// produced for this URL on this attempt.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// An error during the HTTP request (e.g., network failure, connection reset).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned an error (non-2xx status or `success: false`).
    #[error("API error: {0}")]
    Api(String),

    /// The provider answered, but the extracted data is missing fields or out of range.
    #[error("extracted data does not match schema: {0}")]
    Schema(String),

    /// The extraction did not finish within the allotted time.
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
}
