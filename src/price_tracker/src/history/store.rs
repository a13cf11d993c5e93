//! Scoped-connection handle over the history repository.
//!
//! [`HistoryStore`] keeps only the database locator. Every operation opens a
//! fresh connection, runs (inside a transaction where it writes), and drops the
//! connection on return, so no session outlives the operation that needed it.
//! The async helpers move the work onto tokio's blocking pool.

use std::sync::Arc;

use diesel::SqliteConnection;
use product_extractor::ProductSnapshot;

use crate::{
    db::{connection::connect_sqlite, migrate},
    history::{HistoryRepo, PricePoint, SqliteHistoryRepo, StoreError, StoreResult},
    models::{PriceHistoryEntry, Product},
};

/// Cloneable handle to the product/price-history database.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    database_url: Arc<str>,
    repo: SqliteHistoryRepo,
}

impl HistoryStore {
    /// Applies pending migrations and returns a handle to the database.
    pub fn open(database_url: &str) -> StoreResult<Self> {
        migrate::run_all(database_url)?;
        Ok(Self::new(database_url))
    }

    /// Returns a handle without touching the database.
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: Arc::from(database_url),
            repo: SqliteHistoryRepo::new(),
        }
    }

    /// The configured locator.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Opens a connection with the standard PRAGMAs applied.
    pub fn connect(&self) -> StoreResult<SqliteConnection> {
        connect_sqlite(&self.database_url)
    }

    /// Runs `f` on a connection that lives only for the call.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&SqliteHistoryRepo, &mut SqliteConnection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.connect()?;
        f(&self.repo, &mut conn)
    }

    /// Runs `f` on the blocking pool with a connection that lives only for the call.
    pub async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&SqliteHistoryRepo, &mut SqliteConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.with_conn(f))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
    }

    /// See [`HistoryRepo::add_product`].
    pub async fn add_product(&self, url: &str) -> StoreResult<bool> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.add_product(conn, &url)).await
    }

    /// See [`HistoryRepo::product_exists`].
    pub async fn product_exists(&self, url: &str) -> StoreResult<bool> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.product_exists(conn, &url)).await
    }

    /// See [`HistoryRepo::get_product`].
    pub async fn get_product(&self, url: &str) -> StoreResult<Option<Product>> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.get_product(conn, &url)).await
    }

    /// See [`HistoryRepo::record_snapshot`].
    pub async fn record_snapshot(&self, url: &str, snapshot: ProductSnapshot) -> StoreResult<i32> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.record_snapshot(conn, &url, &snapshot))
            .await
    }

    /// See [`HistoryRepo::earliest_price`].
    pub async fn earliest_price(&self, url: &str) -> StoreResult<Option<PricePoint>> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.earliest_price(conn, &url)).await
    }

    /// See [`HistoryRepo::latest_price`].
    pub async fn latest_price(&self, url: &str) -> StoreResult<Option<PricePoint>> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.latest_price(conn, &url)).await
    }

    /// See [`HistoryRepo::price_history`].
    pub async fn price_history(&self, url: &str) -> StoreResult<Vec<PriceHistoryEntry>> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.price_history(conn, &url)).await
    }

    /// See [`HistoryRepo::list_products`].
    pub async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.run(|repo, conn| repo.list_products(conn)).await
    }

    /// See [`HistoryRepo::remove_product`].
    pub async fn remove_product(&self, url: &str) -> StoreResult<usize> {
        let url = url.to_string();
        self.run(move |repo, conn| repo.remove_product(conn, &url)).await
    }
}
