//! Discord incoming-webhook dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::notify::{AlertDispatcher, DispatchError, PriceAlert};

const EMBED_COLOR_GREEN: u32 = 0x2e_cc_71;

/// Posts alerts as embeds to a Discord webhook URL.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

#[derive(Serialize, Debug)]
struct WebhookBody {
    embeds: Vec<Embed>,
}

#[derive(Serialize, Debug)]
struct Embed {
    title: String,
    url: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
}

#[derive(Serialize, Debug)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

impl DiscordWebhook {
    /// Creates a dispatcher for `webhook_url`, with a 10s request timeout.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    fn body(alert: &PriceAlert) -> WebhookBody {
        let field = |name, value: String| EmbedField {
            name,
            value,
            inline: true,
        };
        WebhookBody {
            embeds: vec![Embed {
                title: "Price Drop Alert!".to_string(),
                url: alert.url.clone(),
                description: format!("**{}**", alert.product_name),
                color: EMBED_COLOR_GREEN,
                fields: vec![
                    field("Old Price", format!("{:.2} {}", alert.old_price, alert.currency)),
                    field("New Price", format!("{:.2} {}", alert.new_price, alert.currency)),
                    field("Drop", format!("{:.1}%", alert.drop_percent())),
                ],
            }],
        }
    }
}

#[async_trait]
impl AlertDispatcher for DiscordWebhook {
    async fn dispatch(&self, alert: &PriceAlert) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::body(alert))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
