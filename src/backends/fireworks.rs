//! Fireworks AI chat-completions client used by the relay.
//!
//! Each call is authorized with the caller's own key; the key is only ever
//! handed to `bearer_auth` and is never logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RelayConfig;
use crate::error::AssistantError;

/// Returned when the provider answers without any text.
pub const NO_RESPONSE_TEXT: &str = "No response generated";
const GENERIC_UPSTREAM_ERROR: &str = "AI API request failed";

/// A provider that turns a single query into a single answer.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        api_key: &SecretString,
        query: &str,
        max_tokens: u32,
    ) -> Result<String, AssistantError>;
}

/// Configuration for the Fireworks client.
#[derive(Debug, Clone)]
pub struct FireworksConfig {
    /// Full chat-completions endpoint URL.
    pub api_url: String,
    /// Model identifier.
    pub model: String,
    /// System prompt steering toward short, direct answers.
    pub system: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Request timeout.
    pub timeout: Duration,
}

impl From<&RelayConfig> for FireworksConfig {
    fn from(config: &RelayConfig) -> Self {
        Self {
            api_url: config.upstream_url.clone(),
            model: config.model.clone(),
            system: config.system_prompt.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            timeout: config.timeout(),
        }
    }
}

/// Client for Fireworks' OpenAI-compatible chat API.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct Fireworks {
    pub config: Arc<FireworksConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct FireworksChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct FireworksChatRequest<'a> {
    model: &'a str,
    messages: Vec<FireworksChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize, Debug, Default)]
struct FireworksChatResponse {
    #[serde(default)]
    choices: Vec<FireworksChatChoice>,
}

#[derive(Deserialize, Debug)]
struct FireworksChatChoice {
    #[serde(default)]
    message: Option<FireworksChatMsg>,
}

#[derive(Deserialize, Debug)]
struct FireworksChatMsg {
    #[serde(default)]
    content: Option<String>,
}

impl FireworksChatResponse {
    fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.clone())
            .filter(|content| !content.is_empty())
    }
}

impl Fireworks {
    pub fn new(config: FireworksConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AssistantError::Config(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a Fireworks client with a custom HTTP client.
    pub fn with_client(client: Client, config: FireworksConfig) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

#[async_trait]
impl CompletionBackend for Fireworks {
    async fn complete(
        &self,
        api_key: &SecretString,
        query: &str,
        max_tokens: u32,
    ) -> Result<String, AssistantError> {
        let body = FireworksChatRequest {
            model: &self.config.model,
            messages: vec![
                FireworksChatMessage {
                    role: "system",
                    content: &self.config.system,
                },
                FireworksChatMessage {
                    role: "user",
                    content: query,
                },
            ],
            max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stream: false,
        };

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("Fireworks API response status: {status}");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::warn!("Fireworks API error: {text}");
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(status.as_u16(), &text),
            });
        }

        let json_resp: FireworksChatResponse = resp.json().await?;
        log::debug!(
            "Fireworks API success, choices length: {}",
            json_resp.choices.len()
        );

        Ok(json_resp
            .text()
            .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()))
    }
}

/// Best-effort message from an upstream error body: `error.message`, then
/// `detail`, then a generic text. Bodies that are not JSON are reported raw.
fn upstream_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .or_else(|| value.get("detail").and_then(Value::as_str))
            .filter(|message| !message.is_empty())
            .unwrap_or(GENERIC_UPSTREAM_ERROR)
            .to_string(),
        Err(_) => format!("HTTP {status}: {body}"),
    }
}
