//! OpenAI chat-completions client.

use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{SuggestError, SuggestionProvider};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are a helpful assistant that provides restaurant suggestions. \
Provide exactly 5 restaurant suggestions based on the prompt. \
Return only the restaurant names, separated by newlines. \
Don't include numbering, explanations, or any other text.";

/// Connection settings for [`OpenAiSuggester`].
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_API_URL` and `OPENAI_MODEL`.
    ///
    /// Returns `None` when no (non-empty) API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(url) = env::var("OPENAI_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.model = model;
        }
        Some(config)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Asks an OpenAI-compatible chat endpoint for five restaurant names.
///
/// Any transport or API failure surfaces as a [`SuggestError`]; wrap in
/// [`WithFallback`](crate::WithFallback) to always get an answer.
#[derive(Debug, Clone)]
pub struct OpenAiSuggester {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiSuggester {
    pub fn new(config: OpenAiConfig) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SuggestError::Http)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn request<'a>(&'a self, prompt: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Suggest restaurants for this request: {prompt}"),
                },
            ],
            temperature: 0.7,
            max_tokens: 100,
        }
    }
}

impl SuggestionProvider for OpenAiSuggester {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>, SuggestError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(SuggestError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestError::Provider(format!("API error {status}: {body}")));
        }

        let body: ChatResponse = response.json().await.map_err(SuggestError::Http)?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SuggestError::EmptyResponse)?;

        let names = parse_suggestion_lines(&content);
        tracing::debug!(model = %self.config.model, count = names.len(), "received AI suggestions");
        Ok(names)
    }
}

/// Splits a completion into one restaurant name per non-blank line.
pub fn parse_suggestion_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
