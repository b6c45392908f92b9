//! HTTP relay that keeps the provider call off the page: validates the
//! caller's request, forwards it to the upstream backend with the caller's
//! key and returns a single `{response}` or `{error, details}` body.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::backends::{CompletionBackend, Fireworks, FireworksConfig};
use crate::config::RelayConfig;
use crate::error::AssistantError;
use crate::protocol::CHAT_PATH;

mod handlers;

pub use handlers::{handle_chat, health, method_not_allowed, token_budget, ApiError};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
    pub backend: Arc<dyn CompletionBackend>,
    /// Used when the caller omits `maxTokens`.
    pub default_max_tokens: u32,
    pub max_tokens_cap: u32,
}

impl ServerState {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &RelayConfig) -> Self {
        Self {
            backend,
            default_max_tokens: config.default_max_tokens,
            max_tokens_cap: config.max_tokens_cap,
        }
    }

    /// State backed by the Fireworks provider described in `config`.
    pub fn from_config(config: &RelayConfig) -> Result<Self, AssistantError> {
        let backend = Fireworks::new(FireworksConfig::from(config))?;
        Ok(Self::new(Arc::new(backend), config))
    }
}

/// Builds the relay router with permissive CORS.
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(CHAT_PATH, post(handle_chat).fallback(method_not_allowed))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Serves the relay on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Relay listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
