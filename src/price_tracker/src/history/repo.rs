//! Diesel implementation of [`HistoryRepo`](super::HistoryRepo) for SQLite.

use diesel::prelude::*;
use product_extractor::ProductSnapshot;

use crate::{
    history::{HistoryRepo, PricePoint, StoreError, StoreResult, models::ProductLatest},
    models::{NewPriceHistory, PriceHistoryEntry, Product},
    schema::{price_histories::dsl as ph, products::dsl as p},
    tz,
};

/// Repository for products and price history in a SQLite database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteHistoryRepo;

impl SqliteHistoryRepo {
    /// Creates the repository. It holds no state; connections are passed per call.
    pub fn new() -> Self {
        Self
    }
}

fn price_point((price, currency, observed_at): (f64, String, String)) -> StoreResult<PricePoint> {
    let observed_at = tz::parse_ts_to_utc(&observed_at).map_err(|source| StoreError::Timestamp {
        value: observed_at.clone(),
        source,
    })?;
    Ok(PricePoint {
        price,
        currency,
        observed_at,
    })
}

impl HistoryRepo for SqliteHistoryRepo {
    fn add_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<bool> {
        let n = diesel::insert_into(p::products)
            .values(p::url.eq(url))
            .on_conflict(p::url)
            .do_nothing()
            .execute(conn)?;
        Ok(n == 1)
    }

    fn product_exists(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<bool> {
        let exists = diesel::select(diesel::dsl::exists(p::products.filter(p::url.eq(url))))
            .get_result::<bool>(conn)?;
        Ok(exists)
    }

    fn get_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<Option<Product>> {
        let product = p::products
            .filter(p::url.eq(url))
            .select(Product::as_select())
            .first(conn)
            .optional()?;
        Ok(product)
    }

    fn record_snapshot(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
        snapshot: &ProductSnapshot,
    ) -> StoreResult<i32> {
        if !snapshot.price.is_finite() || snapshot.price < 0.0 {
            return Err(StoreError::InvalidPrice(snapshot.price));
        }
        let observed_at = tz::to_rfc3339_millis(snapshot.observed_at);

        // BEGIN IMMEDIATE: take the write lock up front so the product row and
        // the history row land together or not at all.
        conn.immediate_transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(p::products)
                .values(p::url.eq(url))
                .on_conflict(p::url)
                .do_nothing()
                .execute(conn)?;

            let last_checked: Option<String> = p::products
                .filter(p::url.eq(url))
                .select(p::last_checked_at)
                .first(conn)?;

            // Only move last-known fields forward in time.
            let fresher = last_checked.is_none_or(|prev| observed_at >= prev);
            if fresher {
                diesel::update(p::products.filter(p::url.eq(url)))
                    .set(&ProductLatest {
                        name: Some(&snapshot.name),
                        currency: Some(&snapshot.currency),
                        main_image_url: snapshot.main_image_url.as_deref(),
                        last_price: Some(snapshot.price),
                        last_checked_at: Some(&observed_at),
                    })
                    .execute(conn)?;
            }

            let id = diesel::insert_into(ph::price_histories)
                .values(&NewPriceHistory {
                    product_url: url,
                    name: &snapshot.name,
                    price: snapshot.price,
                    currency: &snapshot.currency,
                    main_image_url: snapshot.main_image_url.as_deref(),
                    observed_at: &observed_at,
                })
                .returning(ph::id)
                .get_result::<i32>(conn)?;

            Ok(id)
        })
    }

    fn earliest_price(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Option<PricePoint>> {
        ph::price_histories
            .filter(ph::product_url.eq(url))
            .order((ph::observed_at.asc(), ph::id.asc()))
            .select((ph::price, ph::currency, ph::observed_at))
            .first::<(f64, String, String)>(conn)
            .optional()?
            .map(price_point)
            .transpose()
    }

    fn latest_price(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Option<PricePoint>> {
        ph::price_histories
            .filter(ph::product_url.eq(url))
            .order((ph::observed_at.desc(), ph::id.desc()))
            .select((ph::price, ph::currency, ph::observed_at))
            .first::<(f64, String, String)>(conn)
            .optional()?
            .map(price_point)
            .transpose()
    }

    fn price_history(
        &self,
        conn: &mut SqliteConnection,
        url: &str,
    ) -> StoreResult<Vec<PriceHistoryEntry>> {
        let rows = ph::price_histories
            .filter(ph::product_url.eq(url))
            .order((ph::observed_at.asc(), ph::id.asc()))
            .select(PriceHistoryEntry::as_select())
            .load(conn)?;
        Ok(rows)
    }

    fn list_products(&self, conn: &mut SqliteConnection) -> StoreResult<Vec<Product>> {
        let rows = p::products
            .order((p::created_at.asc(), p::url.asc()))
            .select(Product::as_select())
            .load(conn)?;
        Ok(rows)
    }

    fn remove_product(&self, conn: &mut SqliteConnection, url: &str) -> StoreResult<usize> {
        conn.immediate_transaction::<_, StoreError, _>(|conn| {
            // Explicit child delete first; the FK cascade covers tracked_urls.
            let purged =
                diesel::delete(ph::price_histories.filter(ph::product_url.eq(url))).execute(conn)?;
            diesel::delete(p::products.filter(p::url.eq(url))).execute(conn)?;
            Ok(purged)
        })
    }
}
