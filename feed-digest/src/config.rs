use crate::recency::{default_window, DEFAULT_WINDOW_HOURS};
use crate::translator::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::types::{Delivery, Dialect, DigestError, FetchConfig, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://www.producthunt.com/feed?category=undefined";
pub const DEFAULT_TRANSLATE_CONCURRENCY: usize = 2;
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

/// Runtime settings, read once at startup and passed down explicitly.
#[derive(Clone)]
pub struct Config {
    pub feed_url: String,
    pub slack_webhook_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub dialect: Dialect,
    pub delivery: Delivery,
    pub window_hours: i64,
    pub translate_concurrency: usize,
    pub fetch: FetchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| DigestError::Config(format!("{} must be set", key)))
        };

        let config = Self {
            feed_url: get("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            slack_webhook_url: required("SLACK_WEBHOOK_URL")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_api_url: get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            dialect: parse_or("FEED_DIALECT", get("FEED_DIALECT"), Dialect::default())?,
            delivery: parse_or("DELIVERY_MODE", get("DELIVERY_MODE"), Delivery::default())?,
            window_hours: parse_or("RECENCY_WINDOW_HOURS", get("RECENCY_WINDOW_HOURS"), DEFAULT_WINDOW_HOURS)?,
            translate_concurrency: parse_or(
                "TRANSLATE_CONCURRENCY",
                get("TRANSLATE_CONCURRENCY"),
                DEFAULT_TRANSLATE_CONCURRENCY,
            )?,
            fetch: FetchConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("FEED_URL", &self.feed_url),
            ("SLACK_WEBHOOK_URL", &self.slack_webhook_url),
            ("OPENAI_API_URL", &self.openai_api_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| DigestError::Config(format!("{} is not a valid URL: {}", name, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(DigestError::Config(format!("{} must be an http(s) URL", name)));
            }
        }

        if self.window_hours <= 0 {
            return Err(DigestError::Config("RECENCY_WINDOW_HOURS must be positive".to_string()));
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(DigestError::Config(format!(
                "RECENCY_WINDOW_HOURS must be at most {}",
                MAX_WINDOW_HOURS
            )));
        }
        if self.translate_concurrency == 0 {
            return Err(DigestError::Config("TRANSLATE_CONCURRENCY must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Falls back to the default window if `window_hours` was never validated.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.window_hours).unwrap_or_else(default_window)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("feed_url", &self.feed_url)
            .field("slack_webhook_url", &"***")
            .field("openai_api_key", &"***")
            .field("openai_model", &self.openai_model)
            .field("openai_api_url", &self.openai_api_url)
            .field("dialect", &self.dialect)
            .field("delivery", &self.delivery)
            .field("window_hours", &self.window_hours)
            .field("translate_concurrency", &self.translate_concurrency)
            .finish()
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| DigestError::Config(format!("{}={}: {}", key, raw, e))),
    }
}
