//! Upstream chat-completion providers the relay forwards to.

pub mod fireworks;

pub use fireworks::{CompletionBackend, Fireworks, FireworksConfig, NO_RESPONSE_TEXT};
