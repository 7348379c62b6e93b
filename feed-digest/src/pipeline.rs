use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::message::{digest_messages, entry_message, SlackMessage};
use crate::parser::FeedParser;
use crate::recency::{default_window, filter_recent};
use crate::slack::{ConsoleSink, SlackWebhook};
use crate::traits::{ChatSink, FeedSource, Translator};
use crate::translator::OpenAiTranslator;
use crate::types::{Delivery, DeliveryReport, FeedEntry, Result, RunOutcome, TranslatedEntry};
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub window: Duration,
    pub delivery: Delivery,
    pub translate_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window: default_window(),
            delivery: Delivery::Digest,
            translate_concurrency: 1,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            window: config.window(),
            delivery: config.delivery,
            translate_concurrency: config.translate_concurrency,
        }
    }
}

/// Result of translating one entry, kept per entry so failures stay isolated.
pub struct TranslationOutcome {
    pub title: String,
    pub result: Result<TranslatedEntry>,
}

/// Fetch, extract, filter, translate and post, stopping at the first empty stage.
pub struct DigestPipeline {
    source: Box<dyn FeedSource>,
    translator: Box<dyn Translator>,
    chat: Box<dyn ChatSink>,
    parser: FeedParser,
    settings: PipelineSettings,
}

impl DigestPipeline {
    pub fn new(
        source: Box<dyn FeedSource>,
        translator: Box<dyn Translator>,
        chat: Box<dyn ChatSink>,
        parser: FeedParser,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            translator,
            chat,
            parser,
            settings,
        }
    }

    /// Wire the HTTP collaborators described by `config`. With `dry_run` the
    /// payloads are printed instead of posted.
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        let source = Fetcher::new(&config.feed_url, config.fetch.clone())?;
        let translator = OpenAiTranslator::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_api_url.clone(),
            &config.fetch,
        )?;
        let chat: Box<dyn ChatSink> = if dry_run {
            Box::new(ConsoleSink)
        } else {
            Box::new(SlackWebhook::new(&config.slack_webhook_url, &config.fetch)?)
        };

        Ok(Self::new(
            Box::new(source),
            Box::new(translator),
            chat,
            FeedParser::new(config.dialect),
            PipelineSettings::from(config),
        ))
    }

    pub async fn run(&self, now: DateTime<Utc>) -> RunOutcome {
        let run_id = Uuid::new_v4();
        self.run_stages(now)
            .instrument(info_span!("digest_run", run_id = %run_id))
            .await
    }

    async fn run_stages(&self, now: DateTime<Utc>) -> RunOutcome {
        info!(
            "Starting digest run: source={}, translator={}, dialect={}, delivery={}",
            self.source.source_name(),
            self.translator.translator_name(),
            self.parser.dialect(),
            self.settings.delivery
        );

        let document = match self.source.fetch().await {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to fetch feed: {}", e);
                return RunOutcome::FeedUnavailable;
            }
        };

        let entries = self.parser.extract(&document);
        if entries.is_empty() {
            warn!("No entries found in feed, nothing to post");
            return RunOutcome::NoEntries;
        }

        let total = entries.len();
        let recent = filter_recent(entries, now, self.settings.window);
        if recent.is_empty() {
            info!(
                "None of the {} entries were published in the last {}h",
                total,
                self.settings.window.num_hours()
            );
            return RunOutcome::NothingRecent;
        }
        info!("{} of {} entries are recent", recent.len(), total);

        let outcomes = self.translate_all(recent).await;
        let attempted = outcomes.len();
        let translated: Vec<TranslatedEntry> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping '{}': {}", outcome.title, e);
                    None
                }
            })
            .collect();

        if translated.is_empty() {
            error!("All {} translations failed, nothing to post", attempted);
            return RunOutcome::NothingTranslated;
        }

        let report = self.deliver(&translated, attempted - translated.len()).await;
        RunOutcome::Delivered(report)
    }

    /// Translate entries with bounded concurrency; output order matches input order.
    pub async fn translate_all(&self, entries: Vec<FeedEntry>) -> Vec<TranslationOutcome> {
        let translator = self.translator.as_ref();
        stream::iter(entries)
            .map(move |entry| {
                let title = entry.title.clone();
                async move {
                    TranslationOutcome {
                        title,
                        result: translate_entry(translator, entry).await,
                    }
                }
            })
            .buffered(self.settings.translate_concurrency.max(1))
            .collect()
            .await
    }

    async fn deliver(&self, translated: &[TranslatedEntry], translation_failures: usize) -> DeliveryReport {
        let messages: Vec<SlackMessage> = match self.settings.delivery {
            Delivery::Digest => digest_messages(translated),
            Delivery::PerEntry => translated.iter().map(entry_message).collect(),
        };

        let mut report = DeliveryReport {
            entries: translated.len(),
            translation_failures,
            ..Default::default()
        };

        for message in &messages {
            match self.chat.post(message).await {
                Ok(()) => report.messages_sent += 1,
                Err(e) => {
                    error!("Failed to post to {}: {}", self.chat.sink_name(), e);
                    report.messages_failed += 1;
                }
            }
        }

        info!(
            "Posted {}/{} messages for {} entries ({} translation failures)",
            report.messages_sent,
            messages.len(),
            report.entries,
            report.translation_failures
        );
        report
    }
}

/// Translate title and description of one entry.
pub async fn translate_entry(translator: &dyn Translator, entry: FeedEntry) -> Result<TranslatedEntry> {
    let translated_title = translator.translate(&entry.title).await?;
    let translated_description = translator.translate(&entry.description).await?;

    Ok(TranslatedEntry {
        entry,
        translated_title,
        translated_description,
    })
}
