//! Slack Block Kit payloads built from translated entries.

use crate::types::TranslatedEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;

const HEADER_LIMIT: usize = 150;
const SECTION_LIMIT: usize = 3000;
const MAX_BLOCKS: usize = 50;
const LINK_LABEL: &str = "ProductHuntで見る";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText { text: text.into() }
    }

    fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }
}

/// Digest messages listing every entry: a count header and a section per entry.
///
/// Slack rejects payloads with more than 50 blocks, so long digests are split
/// into several messages, each with its own header.
pub fn digest_messages(entries: &[TranslatedEntry]) -> Vec<SlackMessage> {
    let chunks: Vec<&[TranslatedEntry]> = if entries.is_empty() {
        vec![entries]
    } else {
        entries.chunks(MAX_BLOCKS - 1).collect()
    };
    let parts = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut title = format!("🚀 昨日の新着プロダクト ({}件)", entries.len());
            if parts > 1 {
                title.push_str(&format!(" {}/{}", index + 1, parts));
            }

            let mut blocks = Vec::with_capacity(chunk.len() + 1);
            blocks.push(Block::Header {
                text: TextObject::plain(truncate(&title, HEADER_LIMIT)),
            });
            blocks.extend(chunk.iter().map(digest_section));

            SlackMessage { blocks }
        })
        .collect()
}

fn digest_section(translated: &TranslatedEntry) -> Block {
    let entry = &translated.entry;
    let mut text = format!(
        "*{}*\n{}\n🔗 <{}|{}>\n📅 {}",
        entry.title,
        translated.translated_description,
        entry.link,
        LINK_LABEL,
        format_date(entry.published_at)
    );
    if !entry.categories.is_empty() {
        text.push_str(&format!("\n🏷️ {}", entry.categories.join(", ")));
    }

    Block::Section {
        text: TextObject::mrkdwn(truncate(&text, SECTION_LIMIT)),
    }
}

/// A message for a single entry with its metadata in a context line.
pub fn entry_message(translated: &TranslatedEntry) -> SlackMessage {
    let entry = &translated.entry;

    let mut context = Vec::new();
    if let Some(author) = &entry.author {
        context.push(TextObject::mrkdwn(format!("👤 {}", author)));
    }
    context.push(TextObject::mrkdwn(format!("🔗 <{}|{}>", entry.link, LINK_LABEL)));
    context.push(TextObject::mrkdwn(format!("📅 {}", format_date(entry.published_at))));
    if !entry.categories.is_empty() {
        context.push(TextObject::mrkdwn(format!("🏷️ {}", entry.categories.join(", "))));
    }

    let mut blocks = vec![Block::Header {
        text: TextObject::plain(truncate(
            &format!("🚀 新着プロダクト: {}", translated.translated_title),
            HEADER_LIMIT,
        )),
    }];
    if !translated.translated_description.is_empty() {
        blocks.push(Block::Section {
            text: TextObject::mrkdwn(truncate(&translated.translated_description, SECTION_LIMIT)),
        });
    }
    blocks.push(Block::Context { elements: context });

    SlackMessage { blocks }
}

fn format_date(published_at: DateTime<Utc>) -> String {
    published_at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}
