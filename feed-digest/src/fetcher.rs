use crate::traits::FeedSource;
use crate::types::{DigestError, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Fetches the feed document over HTTP.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    url: String,
}

impl Fetcher {
    pub fn new(url: &str, config: FetchConfig) -> Result<Self> {
        Url::parse(url)?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            url: url.to_string(),
        })
    }

    pub async fn fetch_document(&self) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DigestError::Fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_feed_size_mb {
                return Err(DigestError::Fetch(format!("Feed too large: {}MB", size_mb)));
            }
        }

        let content = response.text().await?;
        if content.trim().is_empty() {
            return Err(DigestError::Fetch("Feed returned an empty body".to_string()));
        }

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            self.url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}

#[async_trait]
impl FeedSource for Fetcher {
    fn source_name(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.domain().map(|d| format!("Feed ({})", d)))
            .unwrap_or_else(|| "Feed".to_string())
    }

    async fn fetch(&self) -> Result<String> {
        self.fetch_document().await
    }
}
