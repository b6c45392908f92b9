//! AI answers for search result pages.
//!
//! The crate is split into a relay endpoint (feature `api`) that calls the
//! upstream model on the user's behalf, and host-independent controllers for
//! the page widget, popup chat, options page and lifecycle hooks. Hosts
//! provide storage, the current URL and rendering; controllers own state and
//! emit view models.

pub mod backends;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod markup;
pub mod options;
pub mod popup;
pub mod protocol;
#[cfg(feature = "api")]
pub mod relay;
pub mod settings;
pub mod storage;
pub mod widget;

pub use client::{AnswerRequest, AnswerSource, RelayClient};
pub use error::AssistantError;
pub use history::{ChatHistoryStore, ChatMessage, Sender};
pub use settings::{PartialSettings, Settings, SettingsStore};
pub use storage::{JsonFileArea, MemoryArea, StorageArea};
