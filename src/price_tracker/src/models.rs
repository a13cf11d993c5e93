//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel’s Queryable/Insertable APIs:
//! - [`crate::schema::products`] — one row per product URL with denormalized last-known fields
//! - [`crate::schema::price_histories`] — append-only ledger of observed prices
//! - [`crate::schema::tracked_urls`] — table-backed tracking list (see [`crate::tracking::source`])
//!
//! See migrations for constraints (`price >= 0` checks and `ON DELETE CASCADE` FKs).

use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::products`]: one product, keyed by its page URL.
///
/// Name, currency, image and price stay `None` until the first successful check.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = products, primary_key(url), check_for_backend(diesel::sqlite::Sqlite))]
pub struct Product {
    /// Product page URL (primary key).
    pub url: String,
    /// Display name from the most recent snapshot.
    pub name: Option<String>,
    /// Currency code from the most recent snapshot.
    pub currency: Option<String>,
    /// Main image URL from the most recent snapshot.
    pub main_image_url: Option<String>,
    /// Price from the most recent snapshot.
    pub last_price: Option<f64>,
    /// Observation time of the most recent snapshot, RFC3339 UTC.
    pub last_checked_at: Option<String>,
    /// Row creation timestamp in RFC3339 UTC.
    pub created_at: String,
}

/// A row in [`crate::schema::price_histories`]: one observed price.
///
/// Never updated after insertion; removed only when its product is removed.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = price_histories, check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceHistoryEntry {
    /// Synthetic primary key; increases with insertion order.
    pub id: i32,
    /// FK to [`Product::url`].
    pub product_url: String,
    /// Product name as observed.
    pub name: String,
    /// Observed price.
    pub price: f64,
    /// Currency of `price`.
    pub currency: String,
    /// Main image URL as observed.
    pub main_image_url: Option<String>,
    /// Observation time in RFC3339 UTC (millisecond precision).
    pub observed_at: String,
}

/// Insertable form of [`PriceHistoryEntry`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = price_histories)]
pub struct NewPriceHistory<'a> {
    /// FK to [`Product::url`].
    pub product_url: &'a str,
    /// Product name as observed.
    pub name: &'a str,
    /// Observed price.
    pub price: f64,
    /// Currency of `price`.
    pub currency: &'a str,
    /// Main image URL as observed.
    pub main_image_url: Option<&'a str>,
    /// Observation time in RFC3339 UTC.
    pub observed_at: &'a str,
}

/// A row in [`crate::schema::tracked_urls`].
#[derive(Debug, Clone, Queryable, Insertable, Selectable)]
#[diesel(table_name = tracked_urls, check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrackedUrl {
    /// Tracked product URL; FK to [`Product::url`].
    pub url: String,
    /// Zero-based position in insertion order.
    pub position: i32,
}
