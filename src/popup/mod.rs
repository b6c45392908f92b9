//! Popup chat: a linear transcript backed by the persisted chat history.

mod controller;
mod view;

pub use controller::{ChatController, ChatState, SendOutcome, TranscriptEntry};
pub use view::{render, ChatView, MessageView};

pub const WELCOME_MESSAGE: &str = "👋 Hi! I'm Dobby, your AI search assistant. Ask me anything!";
pub const MISSING_KEY_MESSAGE: &str = "⚠️ Please configure your API key in settings first.";
pub const FAILURE_MESSAGE: &str = "⚠️ Sorry, I couldn't process your request. Please try again.";
pub const PERSIST_FAILED_MESSAGE: &str = "⚠️ Failed to save chat history";
