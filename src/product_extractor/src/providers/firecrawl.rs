//! Firecrawl scrape-and-extract REST provider.

pub mod provider;
pub mod request;
pub mod response;

pub use provider::FirecrawlProvider;
