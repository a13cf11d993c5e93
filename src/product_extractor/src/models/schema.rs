//! Statically declared extraction schema.
//!
//! The schema sent to the extraction provider is versioned on its own and does
//! not follow the layout of [`ProductSnapshot`](crate::models::snapshot::ProductSnapshot).
//! Bump [`PRODUCT_SCHEMA_VERSION`] whenever a property is added, removed or
//! changes meaning.

use serde_json::{Value, json};

/// Version of the JSON schema returned by [`product_schema`].
pub const PRODUCT_SCHEMA_VERSION: u32 = 1;

/// JSON schema describing the fields extracted from a product page.
pub fn product_schema() -> Value {
    json!({
        "$id": format!("price-tracker/product/v{PRODUCT_SCHEMA_VERSION}"),
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "The name of the product"
            },
            "price": {
                "type": "number",
                "description": "The current price of the product"
            },
            "currency": {
                "type": "string",
                "description": "Currency code of the price, e.g. USD, EUR, GBP"
            },
            "main_image_url": {
                "type": "string",
                "description": "The URL of the main image of the product"
            }
        },
        "required": ["name", "price", "currency"]
    })
}
