pub mod types;
pub mod config;
pub mod markup;
pub mod parser;
pub mod recency;
pub mod traits;
pub mod fetcher;
pub mod translator;
pub mod message;
pub mod slack;
pub mod pipeline;

pub use types::*;
pub use config::Config;
pub use markup::rewrite;
pub use parser::FeedParser;
pub use recency::{filter_recent, DEFAULT_WINDOW_HOURS};
pub use traits::{ChatSink, FeedSource, Translator};
pub use fetcher::Fetcher;
pub use translator::OpenAiTranslator;
pub use message::SlackMessage;
pub use slack::{ConsoleSink, SlackWebhook};
pub use pipeline::{DigestPipeline, PipelineSettings};
