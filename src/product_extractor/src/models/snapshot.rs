//! Canonical representation of one observation of a product page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::providers::errors::ExtractionError;

/// One observed `{name, price, currency, image}` tuple for a product at a point in time.
///
/// Produced by every [`ProductExtractor`](crate::providers::ProductExtractor)
/// regardless of which provider did the scraping. Instances built through
/// [`ExtractedProduct::into_snapshot`] always carry a non-empty name, a finite
/// non-negative price and an upper-case currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Display name of the product.
    pub name: String,
    /// Observed price, denominated in `currency`.
    pub price: f64,
    /// ISO-4217-like currency code (e.g. "USD").
    pub currency: String,
    /// URL of the main product image, when the page exposes one.
    pub main_image_url: Option<String>,
    /// When the observation was made (UTC).
    pub observed_at: DateTime<Utc>,
}

/// A price as returned by the extraction provider.
///
/// Providers backed by language models sometimes return the price as text
/// ("$1,299.00") even when the schema asks for a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// Numeric JSON value.
    Number(f64),
    /// Textual value, possibly with a currency symbol and thousands separators.
    Text(String),
}

impl RawPrice {
    fn to_f64(&self) -> Result<f64, ExtractionError> {
        match self {
            RawPrice::Number(n) => Ok(*n),
            RawPrice::Text(s) => parse_price_text(s)
                .ok_or_else(|| ExtractionError::Schema(format!("unparseable price {s:?}"))),
        }
    }
}

/// Parses a displayed price such as `"$1,299.50"`, `"€1.299,00"` or `"1 299,00 €"`.
///
/// The last `,` or `.` is the decimal separator when one or two digits follow
/// it, and a grouping separator when three follow. Every other separator,
/// space and currency symbol is dropped.
fn parse_price_text(text: &str) -> Option<f64> {
    let first_digit = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..first_digit].contains('-');

    let kept: Vec<char> = text[first_digit..]
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
        .collect();
    let seps = kept.iter().filter(|c| !c.is_ascii_digit()).count();

    let digits = |cs: &[char]| cs.iter().filter(|c| c.is_ascii_digit()).collect::<String>();
    let normalized = match kept.iter().rposition(|c| !c.is_ascii_digit()) {
        None => digits(&kept),
        Some(pos) => {
            let (int, frac) = (digits(&kept[..pos]), digits(&kept[pos + 1..]));
            let decimal = match frac.len() {
                1 | 2 => true,
                0 | 3 => false,
                _ => seps == 1,
            };
            if decimal {
                format!("{}.{frac}", if int.is_empty() { "0" } else { int.as_str() })
            } else {
                format!("{int}{frac}")
            }
        }
    };

    let value = normalized.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Unvalidated extraction result, shaped by [`crate::models::schema::product_schema`].
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedProduct {
    /// Product name.
    pub name: Option<String>,
    /// Product price.
    pub price: Option<RawPrice>,
    /// Currency code.
    pub currency: Option<String>,
    /// Main image URL.
    #[serde(default)]
    pub main_image_url: Option<String>,
}

impl ExtractedProduct {
    /// Validates the raw extraction and stamps it with `observed_at`.
    ///
    /// Errors with [`ExtractionError::Schema`] when a required field is missing,
    /// the name or currency is blank, or the price is negative or not finite.
    pub fn into_snapshot(
        self,
        observed_at: DateTime<Utc>,
    ) -> Result<ProductSnapshot, ExtractionError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ExtractionError::Schema("missing product name".into()))?;

        let price = self
            .price
            .ok_or_else(|| ExtractionError::Schema("missing price".into()))?
            .to_f64()?;
        if !price.is_finite() || price < 0.0 {
            return Err(ExtractionError::Schema(format!("price out of range: {price}")));
        }

        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ExtractionError::Schema("missing currency".into()))?;

        let main_image_url = self
            .main_image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(ProductSnapshot {
            name,
            price,
            currency,
            main_image_url,
            observed_at,
        })
    }
}
