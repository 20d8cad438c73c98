// semprobe-core/src/gateway.rs
//! Chat model gateway used by the experiment driver to sample answers.
//!
//! The driver only sees the [`ChatModel`] trait, so tests can script
//! responses without a network. [`ChatCompletionsClient`] speaks the
//! OpenAI-compatible chat completions protocol (DeepSeek by default). A call
//! carries a list of role-tagged messages, usually an optional system
//! message followed by a single user message.
//!
//! License: MIT OR Apache-2.0

use std::time::Duration;

use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::errors::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Anything that can answer a conversation with one reply.
pub trait ChatModel: Send + Sync {
    /// Returns the reply to `messages`, oldest turn first.
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, ProbeError>;

    /// Sends `prompt` as the only (user) message.
    fn complete(&self, prompt: &str) -> Result<String, ProbeError> {
        self.chat(&[ChatMessage::user(prompt)])
    }
}

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl ChatCompletionsClient {
    /// Creates a client with bearer authentication.
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: &str,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ProbeError::InvalidConfiguration("Invalid API key format".to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProbeError::ModelRequest(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
            temperature,
            max_tokens: None,
        })
    }

    /// Caps the length of every reply. `None` leaves it to the provider.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Creates a client from provider settings, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProbeError> {
        let api_key = config.api_key()?;
        Self::new(
            config.api_url.clone(),
            config.model.clone(),
            &api_key,
            config.temperature,
            Duration::from_secs(config.timeout_secs),
        )
        .map(|client| client.with_max_tokens(config.max_tokens))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatModel for ChatCompletionsClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, ProbeError> {
        let request = ChatApiRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("POST {} (model={}, {} messages)", self.url, self.model, messages.len());

        let response = self.client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|e| ProbeError::ModelRequest(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProbeError::ModelRequest(format!("failed to read response body: {e}")))?;
        trace!("Chat response ({}): {}", status, body);

        if !status.is_success() {
            return Err(ProbeError::ModelRequest(format!("{} - {}", status, body.trim())));
        }

        let parsed: ChatApiResponse = serde_json::from_str(&body)
            .map_err(|e| ProbeError::ModelRequest(format!("malformed chat response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(ProbeError::ModelRequest(
                err.message.unwrap_or_else(|| "provider returned an error".to_string()),
            ));
        }

        parsed.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProbeError::ModelRequest("chat response contained no message content".to_string()))
    }
}
