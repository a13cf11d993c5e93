use serde::Deserialize;

use crate::models::snapshot::ExtractedProduct;

#[derive(Deserialize, Debug)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Option<ScrapeData>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ScrapeData {
    pub extract: Option<ExtractedProduct>,
}
