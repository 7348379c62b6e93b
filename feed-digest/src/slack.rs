use crate::message::SlackMessage;
use crate::traits::ChatSink;
use crate::types::{DigestError, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Posts messages to a Slack incoming webhook.
pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(webhook_url: &str, fetch_config: &FetchConfig) -> Result<Self> {
        Url::parse(webhook_url)?;

        let client = Client::builder()
            .user_agent(&fetch_config.user_agent)
            .timeout(Duration::from_secs(fetch_config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl ChatSink for SlackWebhook {
    fn sink_name(&self) -> String {
        "Slack webhook".to_string()
    }

    async fn post(&self, message: &SlackMessage) -> Result<()> {
        debug!("Posting message with {} blocks", message.blocks.len());

        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(DigestError::Post {
                status: status.as_u16(),
                body,
            });
        }

        info!("Slack accepted message ({})", status.as_u16());
        Ok(())
    }
}

/// Prints the payload to stdout instead of posting it.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ChatSink for ConsoleSink {
    fn sink_name(&self) -> String {
        "console (dry run)".to_string()
    }

    async fn post(&self, message: &SlackMessage) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(message)?);
        Ok(())
    }
}
