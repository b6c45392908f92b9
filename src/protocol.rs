//! JSON shapes exchanged between the controllers and the relay.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Path of the relay's only endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Body accepted by the relay. Every field is optional on the wire so missing
/// ones can be reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl RelayRequest {
    /// Names of the required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.query.as_deref().map_or(true, str::is_empty) {
            missing.push("query");
        }
        if self
            .api_key
            .as_ref()
            .map_or(true, |key| key.expose_secret().is_empty())
        {
            missing.push("apiKey");
        }
        missing
    }
}

/// Body sent to the relay by the controllers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRequest<'a> {
    pub query: &'a str,
    pub api_key: &'a str,
    pub max_tokens: u32,
}

/// Successful relay answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Failure body returned by the relay. `details` is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
