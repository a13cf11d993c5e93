//! Insertable/changeset helper structs used by the history repository implementation.

use diesel::prelude::*;

use crate::schema::products;

/// Denormalized last-known fields written on every fresher snapshot.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = products, treat_none_as_null = true)]
pub(crate) struct ProductLatest<'a> {
    pub(crate) name: Option<&'a str>,
    pub(crate) currency: Option<&'a str>,
    pub(crate) main_image_url: Option<&'a str>,
    pub(crate) last_price: Option<f64>,
    pub(crate) last_checked_at: Option<&'a str>, // RFC3339 UTC
}
