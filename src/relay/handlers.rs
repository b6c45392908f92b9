#[path = "handlers/chat.rs"]
mod chat;

#[path = "handlers/helpers.rs"]
mod helpers;

pub use chat::{handle_chat, health, method_not_allowed};
pub use helpers::{token_budget, ApiError};
