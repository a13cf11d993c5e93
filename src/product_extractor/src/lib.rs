//! Extraction gateway for the price tracker.
//!
//! Given a product page URL, a [`providers::ProductExtractor`] returns a
//! [`models::snapshot::ProductSnapshot`] (name, price, currency, image,
//! observation time) or fails with a [`providers::errors::ExtractionError`].
//! Scraping and page parsing are delegated to a hosted provider; this crate
//! only owns the request shape, the extraction schema, and validation of what
//! comes back.

pub mod models;
pub mod providers;

pub use models::snapshot::ProductSnapshot;
pub use providers::{ProductExtractor, errors::ExtractionError};
