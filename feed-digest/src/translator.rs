use crate::traits::Translator;
use crate::types::{DigestError, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str =
    "あなたは優秀な翻訳者です。英語を自然な日本語に翻訳してください。";
const TEMPERATURE: f32 = 0.3;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// English to Japanese translation through a chat-completion endpoint.
pub struct OpenAiTranslator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTranslator {
    pub fn new(api_key: String, model: String, api_url: String, fetch_config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&fetch_config.user_agent)
            .timeout(Duration::from_secs(fetch_config.timeout_seconds * 2))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }

    fn request_body<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
        }
    }
}

/// Pull the single completion text out of a chat-completion response body.
fn completion_text(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| DigestError::Translation("response contained no completion text".to_string()))
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn translator_name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        debug!("Translating {} chars with {}", text.chars().count(), self.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DigestError::Translation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        completion_text(&body)
    }
}
