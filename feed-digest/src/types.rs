use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One announcement extracted from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub raw_description: String,
    /// Chat-markup rendering of `raw_description` (or the raw text for RSS feeds).
    pub description: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedEntry {
    pub entry: FeedEntry,
    pub translated_title: String,
    pub translated_description: String,
}

/// Element layout of the feed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `entry` elements in the Atom namespace, HTML body in `content`.
    #[default]
    Atom,
    /// `channel/item` elements with plain `description` and `category` children.
    Rss,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Atom => write!(f, "atom"),
            Dialect::Rss => write!(f, "rss"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atom" => Ok(Dialect::Atom),
            "rss" => Ok(Dialect::Rss),
            other => Err(format!("unknown feed dialect '{}' (expected atom or rss)", other)),
        }
    }
}

/// How translated entries are delivered to chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delivery {
    /// A single message listing every entry.
    #[default]
    Digest,
    /// One message per entry.
    PerEntry,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Digest => write!(f, "digest"),
            Delivery::PerEntry => write!(f, "per-entry"),
        }
    }
}

impl FromStr for Delivery {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" => Ok(Delivery::Digest),
            "per-entry" | "per_entry" | "entry" => Ok(Delivery::PerEntry),
            other => Err(format!("unknown delivery mode '{}' (expected digest or per-entry)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Feed-Digest/1.0".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Counters for a run that reached the chat stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub entries: usize,
    pub translation_failures: usize,
    pub messages_sent: usize,
    pub messages_failed: usize,
}

/// Where a pipeline run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    FeedUnavailable,
    NoEntries,
    NothingRecent,
    NothingTranslated,
    Delivered(DeliveryReport),
}

impl RunOutcome {
    pub fn posted_anything(&self) -> bool {
        matches!(self, RunOutcome::Delivered(report) if report.messages_sent > 0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Chat post rejected with HTTP {status}: {body}")]
    Post { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
