//! Persisted popup chat transcript.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssistantError;
use crate::storage::StorageArea;

/// Storage key of the transcript in the local area.
pub const HISTORY_KEY: &str = "chatHistory";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// Older transcripts stored the assistant under its persona name.
    #[serde(alias = "dobby")]
    Assistant,
}

impl Sender {
    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Assistant => "assistant-message",
        }
    }
}

/// A single entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub sender: Sender,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }
}

/// Whole-list persistence of the transcript.
#[derive(Clone)]
pub struct ChatHistoryStore {
    area: Arc<dyn StorageArea>,
}

impl ChatHistoryStore {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    pub async fn load(&self) -> Result<Vec<ChatMessage>, AssistantError> {
        match self.area.get(HISTORY_KEY).await? {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn save(&self, messages: &[ChatMessage]) -> Result<(), AssistantError> {
        let value = serde_json::to_value(messages)?;
        self.area.set_one(HISTORY_KEY, value).await
    }

    pub async fn clear(&self) -> Result<(), AssistantError> {
        self.area.remove(&[HISTORY_KEY]).await
    }
}
