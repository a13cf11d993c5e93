//! History store: products and their append-only price ledger.
//!
//! [`HistoryRepo`] is the query contract; [`repo::SqliteHistoryRepo`] implements
//! it over a caller-supplied connection. [`store::HistoryStore`] wraps the repo
//! with scoped connections (one per operation) for async callers.

pub(crate) mod models;
pub mod repo;
pub mod store;

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use product_extractor::ProductSnapshot;
use thiserror::Error;

use crate::models::{PriceHistoryEntry, Product};

pub use repo::SqliteHistoryRepo;
pub use store::HistoryStore;

/// Storage-level failures. Fatal for the current check cycle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The locator does not name a SQLite database.
    #[error("unsupported database locator {0:?}: expected a SQLite file path or sqlite: URL")]
    UnsupportedBackend(String),

    /// The database could not be opened.
    #[error("failed to connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// A statement failed (constraint violation, I/O error, busy timeout, ...).
    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// Embedded migrations could not be applied.
    #[error("migration failed: {0}")]
    Migration(String),

    /// A snapshot carried a negative or non-finite price.
    #[error("invalid price {0}: prices must be finite and non-negative")]
    InvalidPrice(f64),

    /// A stored timestamp could not be parsed.
    #[error("malformed stored timestamp {value:?}: {source}")]
    Timestamp {
        /// The stored text.
        value: String,
        /// Parser error.
        source: chrono::ParseError,
    },

    /// The blocking task running a store operation panicked or was cancelled.
    #[error("storage worker failed: {0}")]
    Worker(String),
}

/// Result type used throughout the history store.
pub type StoreResult<T> = Result<T, StoreError>;

/// A single stored price with its currency and observation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    /// Stored price.
    pub price: f64,
    /// Currency of `price`.
    pub currency: String,
    /// When the price was observed.
    pub observed_at: DateTime<Utc>,
}

/// Query contract of the history store. The SQLite implementation lives in `repo.rs`.
pub trait HistoryRepo {
    /// Idempotently registers a bare product row (no price yet).
    ///
    /// Returns `true` when a new row was created.
    fn add_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<bool>;

    /// Returns whether a product row exists for `url`.
    fn product_exists(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<bool>;

    /// Loads the product row for `url`, if any.
    fn get_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<Option<Product>>;

    /// Upserts the product's last-known fields and appends a history entry, atomically.
    ///
    /// Returns the id of the new history entry.
    fn record_snapshot(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
        snapshot: &ProductSnapshot,
    ) -> StoreResult<i32>;

    /// Price of the chronologically earliest entry (ties: first inserted).
    fn earliest_price(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Option<PricePoint>>;

    /// Price of the chronologically latest entry (ties: last inserted).
    fn latest_price(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Option<PricePoint>>;

    /// Full history for `url`, oldest first.
    fn price_history(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Vec<PriceHistoryEntry>>;

    /// All known products, in a stable order (creation time, then URL).
    fn list_products(&self, conn: &mut SqliteConnection) -> StoreResult<Vec<Product>>;

    /// Deletes the product and all of its history. Removing an unknown URL is a no-op.
    ///
    /// Returns the number of history entries purged.
    fn remove_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<usize>;
}
