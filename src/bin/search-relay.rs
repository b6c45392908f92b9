#[path = "search-assistant/logging.rs"]
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use search_assistant::config::load_config;
use search_assistant::relay::{serve, ServerState};

use crate::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "search-relay",
    about = "Relay between the search assistant and the upstream model API"
)]
struct RelayArgs {
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
    /// Address to bind, e.g. 127.0.0.1:3000
    #[arg(long, short = 'l')]
    listen: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = RelayArgs::parse();
    let loaded = load_config(args.config)?;
    let _logger = init_logging(&loaded.config.logging, args.log_level.as_deref(), None)?;

    let relay = loaded.config.relay;
    let listen = args.listen.unwrap_or_else(|| relay.listen.clone());
    let state = ServerState::from_config(&relay)?;
    log::info!("Forwarding to {} with model {}", relay.upstream_url, relay.model);

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Shutting down relay");
                    shutdown.cancel();
                }
                Err(err) => log::warn!("Cannot listen for Ctrl-C: {err}"),
            }
        }
    });

    serve(listener, state, shutdown).await?;
    Ok(())
}
