#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_digest::{ChatSink, DigestError, FeedSource, Result, SlackMessage, Translator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Serves a fixed document, or fails like an unreachable host.
pub struct StaticFeed {
    document: Option<String>,
    pub fetches: Arc<AtomicUsize>,
}

impl StaticFeed {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            document: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    fn source_name(&self) -> String {
        "static feed".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.document
            .clone()
            .ok_or_else(|| DigestError::Fetch("HTTP 503: Service Unavailable".to_string()))
    }
}

/// Prefixes text with `[ja]`; fails on any text containing `fail_marker`.
pub struct FakeTranslator {
    fail_marker: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    fn translator_name(&self) -> String {
        "fake".to_string()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(DigestError::Translation("response contained no completion text".to_string()));
            }
        }
        Ok(format!("[ja] {}", text))
    }
}

/// Records every posted message; optionally rejects them all.
pub struct RecordingChat {
    reject: bool,
    pub posted: Arc<Mutex<Vec<SlackMessage>>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self {
            reject: false,
            posted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            posted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatSink for RecordingChat {
    fn sink_name(&self) -> String {
        "recording chat".to_string()
    }

    async fn post(&self, message: &SlackMessage) -> Result<()> {
        if self.reject {
            return Err(DigestError::Post {
                status: 404,
                body: "no_service".to_string(),
            });
        }
        self.posted.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct AtomEntry<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub published: DateTime<Utc>,
    pub html: &'a str,
    pub author: &'a str,
}

/// Build a Product Hunt style Atom document.
pub fn atom_feed(entries: &[AtomEntry<'_>]) -> String {
    let mut doc = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xml:lang="en-US" xmlns="http://www.w3.org/2005/Atom">
  <id>tag:www.producthunt.com,2005:/feed</id>
  <link rel="alternate" type="text/html" href="https://www.producthunt.com"/>
  <link rel="self" type="application/atom+xml" href="https://www.producthunt.com/feed"/>
  <title>Product Hunt — The best new products, every day</title>
"#,
    );
    doc.push_str(&format!("  <updated>{}</updated>\n", Utc::now().to_rfc3339()));

    for (i, entry) in entries.iter().enumerate() {
        doc.push_str(&format!(
            r#"  <entry>
    <id>tag:www.producthunt.com,2005:Post/{id}</id>
    <published>{published}</published>
    <updated>{published}</updated>
    <link rel="alternate" type="text/html" href="https://www.producthunt.com/posts/{slug}"/>
    <title>{title}</title>
    <content type="html">{content}</content>
    <author>
      <name>{author}</name>
    </author>
  </entry>
"#,
            id = i + 1,
            published = entry.published.to_rfc3339(),
            slug = entry.slug,
            title = escape_xml(entry.title),
            content = escape_xml(entry.html),
            author = escape_xml(entry.author),
        ));
    }

    doc.push_str("</feed>\n");
    doc
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
