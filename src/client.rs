//! HTTP client the controllers use to reach the relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::ClientConfig;
use crate::error::AssistantError;
use crate::protocol::{ChatReply, ErrorBody, OutboundRequest, CHAT_PATH};

/// Query sent by the options page to check a key.
pub const TEST_QUERY: &str = "Hello, this is a test.";
pub const TEST_MAX_TOKENS: u32 = 50;

/// A question for the assistant together with the caller's credentials.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub query: String,
    pub api_key: SecretString,
    pub max_tokens: u32,
}

impl AnswerRequest {
    pub fn new(query: impl Into<String>, api_key: &str, max_tokens: u32) -> Self {
        Self {
            query: query.into(),
            api_key: SecretString::new(api_key.to_string()),
            max_tokens,
        }
    }
}

/// Anything able to turn a query into answer text.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn ask(&self, request: &AnswerRequest) -> Result<String, AssistantError>;

    /// Sends the fixed test query with a small token budget.
    async fn check_connection(&self, api_key: &str) -> Result<(), AssistantError> {
        self.ask(&AnswerRequest::new(TEST_QUERY, api_key, TEST_MAX_TOKENS))
            .await
            .map(|_| ())
    }
}

/// Talks to the relay's `POST /api/chat`.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistantError::Config(format!("HTTP client: {e}")))?;
        Self::with_client(client, &config.relay_url, config.timeout())
    }

    /// Creates a relay client with a custom HTTP client.
    pub fn with_client(
        client: Client,
        relay_url: &str,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let base = Url::parse(relay_url)
            .map_err(|e| AssistantError::Config(format!("invalid relay URL {relay_url}: {e}")))?;
        let endpoint = base
            .join(CHAT_PATH)
            .map_err(|e| AssistantError::Config(format!("invalid relay URL {relay_url}: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerSource for RelayClient {
    async fn ask(&self, request: &AnswerRequest) -> Result<String, AssistantError> {
        let body = OutboundRequest {
            query: &request.query,
            api_key: request.api_key.expose_secret(),
            max_tokens: request.max_tokens,
        };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("Relay HTTP status: {status}");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("HTTP {}: {text}", status.as_u16()));
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatReply = resp.json().await?;
        Ok(reply.response)
    }
}
