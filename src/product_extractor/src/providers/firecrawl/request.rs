use serde::Serialize;
use serde_json::Value;

/// Body of `POST /v1/scrape` asking for LLM extraction against a JSON schema.
#[derive(Serialize, Debug)]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub formats: [&'static str; 1],
    pub extract: ExtractOptions<'a>,
}

#[derive(Serialize, Debug)]
pub struct ExtractOptions<'a> {
    pub schema: &'a Value,
}

impl<'a> ScrapeRequest<'a> {
    pub fn extract(url: &'a str, schema: &'a Value) -> Self {
        Self {
            url,
            formats: ["extract"],
            extract: ExtractOptions { schema },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_extract_format() {
        let schema = json!({"type": "object"});
        let request = ScrapeRequest::extract("https://shop.example/p/1", &schema);
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(
            body,
            json!({
                "url": "https://shop.example/p/1",
                "formats": ["extract"],
                "extract": {"schema": {"type": "object"}}
            })
        );
    }
}
