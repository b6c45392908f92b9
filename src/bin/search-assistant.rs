#[path = "search-assistant/app/mod.rs"]
mod app;
#[path = "search-assistant/args.rs"]
mod args;
#[path = "search-assistant/host.rs"]
mod host;
#[path = "search-assistant/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
