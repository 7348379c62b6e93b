use crate::message::SlackMessage;
use crate::types::Result;
use async_trait::async_trait;

/// Trait for retrieving the raw feed document
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name for this source, used in logs
    fn source_name(&self) -> String;

    /// Fetch the current document body
    async fn fetch(&self) -> Result<String>;
}

/// Trait for translating entry text
#[async_trait]
pub trait Translator: Send + Sync {
    fn translator_name(&self) -> String;

    /// Translate a single piece of text
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Trait for delivering a formatted message to the team channel
#[async_trait]
pub trait ChatSink: Send + Sync {
    fn sink_name(&self) -> String;

    /// Deliver one message. An `Err` means the channel did not accept it.
    async fn post(&self, message: &SlackMessage) -> Result<()>;
}
