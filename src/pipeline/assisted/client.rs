use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::AssistedError;
use crate::config::QuickAddConfig;

/// Seam for the chat-completion backend so the pipeline can be exercised
/// with canned responses in tests.
pub trait LlmClient {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, AssistedError>;
}

/// Blocking client for an OpenAI-compatible chat-completions endpoint
/// (Groq by default).
pub struct GroqClient {
    api_key: String,
    chat_url: String,
    model: String,
    client: Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(api_key: &str, chat_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.to_string(),
            chat_url: chat_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// None when no API key is configured; the pipeline then skips the
    /// assisted stage entirely.
    pub fn from_config(config: &QuickAddConfig) -> Option<Self> {
        config.api_key.as_deref().map(|key| {
            Self::new(
                key,
                &config.chat_url,
                &config.chat_model,
                config.chat_timeout_secs,
            )
        })
    }

    /// Format check first (Groq keys start with "gsk_"), then a one-token
    /// probe against the live endpoint.
    pub fn verify_key(&self) -> Result<(), AssistedError> {
        if !self.api_key.starts_with("gsk_") {
            return Err(AssistedError::InvalidKeyFormat);
        }

        self.send(&ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: "test",
            }],
            temperature: 0.0,
            response_format: None,
            max_tokens: Some(5),
        })
        .map(|_| ())
    }

    fn send(&self, request: &ChatRequest<'_>) -> Result<String, AssistedError> {
        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AssistedError::Connection(self.chat_url.clone())
                } else if e.is_timeout() {
                    AssistedError::Timeout(self.timeout_secs)
                } else {
                    AssistedError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistedError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AssistedError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AssistedError::EmptyCompletion)
    }
}

impl LlmClient for GroqClient {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, AssistedError> {
        self.send(&ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
            max_tokens: None,
        })
    }
}

/// Verify the configured key end to end. A missing key is its own error
/// so settings surfaces can tell "not set" apart from "rejected".
pub fn verify_configured_key(config: &QuickAddConfig) -> Result<(), AssistedError> {
    let key = config.api_key.as_deref().ok_or(AssistedError::NotConfigured)?;
    GroqClient::new(
        key,
        &config.chat_url,
        &config.chat_model,
        config.chat_timeout_secs,
    )
    .verify_key()
}

/// Mock LLM client for testing
pub struct MockLlmClient {
    response: String,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn complete(
        &self,
        _system: &str,
        _user: &str,
        _temperature: f32,
    ) -> Result<String, AssistedError> {
        Ok(self.response.clone())
    }
}
