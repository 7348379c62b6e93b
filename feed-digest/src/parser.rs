use crate::markup;
use crate::types::{Dialect, DigestError, FeedEntry, Result};
use chrono::Utc;
use feed_rs::model::{Entry, Feed, FeedType};
use feed_rs::parser;
use tracing::{debug, info, warn};
use url::Url;

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Turns a raw feed document into [`FeedEntry`] values for one [`Dialect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedParser {
    dialect: Dialect,
}

impl FeedParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Extract every well-formed entry from `document`.
    ///
    /// A document that does not parse, or that is laid out in the other
    /// dialect, yields no entries. Entries missing a title, body, link or
    /// publication date are skipped individually.
    pub fn extract(&self, document: &str) -> Vec<FeedEntry> {
        debug!("Parsing feed content ({} bytes) as {}", document.len(), self.dialect);

        let feed = match self.parse_document(document) {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Ignoring feed: {}", e);
                return Vec::new();
            }
        };

        let total = feed.entries.len();
        let entries: Vec<FeedEntry> = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.parse_entry(entry))
            .collect();

        if entries.len() < total {
            debug!("Dropped {} incomplete entries", total - entries.len());
        }
        info!("Parsed feed with {} entries", entries.len());

        entries
    }

    /// Parse `document` and check it is laid out in this parser's dialect.
    pub fn parse_document(&self, document: &str) -> Result<Feed> {
        let feed = parser::parse(document.as_bytes()).map_err(|e| DigestError::Parse(e.to_string()))?;

        if !self.accepts(&feed.feed_type) {
            return Err(DigestError::Parse(format!(
                "document is {:?} but the {} layout was expected",
                feed.feed_type, self.dialect
            )));
        }
        // feed-rs also accepts a bare <feed> root without the Atom namespace.
        if self.dialect == Dialect::Atom && !document.contains(ATOM_NAMESPACE) {
            return Err(DigestError::Parse(format!(
                "Atom document does not declare the {} namespace",
                ATOM_NAMESPACE
            )));
        }

        Ok(feed)
    }

    fn accepts(&self, feed_type: &FeedType) -> bool {
        match self.dialect {
            Dialect::Atom => matches!(feed_type, FeedType::Atom),
            Dialect::Rss => matches!(
                feed_type,
                FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2
            ),
        }
    }

    fn parse_entry(&self, entry: Entry) -> Option<FeedEntry> {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            debug!("Skipping entry {} without a title", entry.id);
            return None;
        };

        let Some(link) = entry.links.first().and_then(|l| absolute_url(&l.href)) else {
            debug!("Skipping '{}': missing or relative link", title);
            return None;
        };

        let Some(published_at) = entry.published.map(|dt| dt.with_timezone(&Utc)) else {
            debug!("Skipping '{}': missing or unparsable publication date", title);
            return None;
        };

        match self.dialect {
            Dialect::Atom => {
                let Some(raw_description) = entry.content.and_then(|c| c.body) else {
                    debug!("Skipping '{}': no content element", title);
                    return None;
                };
                let description = markup::rewrite(&raw_description);
                let author = entry
                    .authors
                    .into_iter()
                    .map(|a| a.name.trim().to_string())
                    .find(|name| !name.is_empty());

                Some(FeedEntry {
                    title,
                    raw_description,
                    description,
                    link,
                    published_at,
                    author,
                    categories: Vec::new(),
                })
            }
            Dialect::Rss => {
                let Some(raw_description) = entry.summary.map(|s| s.content) else {
                    debug!("Skipping '{}': no description element", title);
                    return None;
                };
                let categories = entry
                    .categories
                    .into_iter()
                    .map(|c| c.term.trim().to_string())
                    .filter(|term| !term.is_empty())
                    .collect();

                Some(FeedEntry {
                    title,
                    description: raw_description.clone(),
                    raw_description,
                    link,
                    published_at,
                    author: None,
                    categories,
                })
            }
        }
    }
}

fn absolute_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(href).ok().map(|_| href.to_string())
}
