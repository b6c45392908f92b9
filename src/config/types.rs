use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
const DEFAULT_UPSTREAM_URL: &str = "https://api.fireworks.ai/inference/v1/chat/completions";
const DEFAULT_MODEL: &str =
    "accounts/sentientfoundation-serverless/models/dobby-mini-unhinged-plus-llama-3-1-8b";
const DEFAULT_SYSTEM_PROMPT: &str = "You are Dobby, a helpful AI assistant that provides concise, accurate answers to search queries. Keep responses under 200 words and focus on being informative and direct.";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 1.0;
const DEFAULT_MAX_TOKENS_CAP: u32 = 500;
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;
const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub relay: RelayConfig,
    pub client: ClientConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Settings of the relay endpoint and the upstream call it makes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    pub listen: String,
    pub upstream_url: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Hard upper bound applied to the caller's `maxTokens`.
    pub max_tokens_cap: u32,
    /// Used when the caller omits `maxTokens`.
    pub default_max_tokens: u32,
    pub timeout_secs: u64,
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens_cap: DEFAULT_MAX_TOKENS_CAP,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_RELAY_TIMEOUT_SECS,
        }
    }
}

/// Settings used by the controllers when they talk to the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub relay_url: String,
    pub timeout_secs: u64,
    /// Delay between a client-side navigation and the widget remount.
    pub settle_delay_ms: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub path: Option<String>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}
