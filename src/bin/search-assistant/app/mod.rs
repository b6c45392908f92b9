mod chat;
mod hooks;
mod settings;
mod widget;

use clap::Parser;

use search_assistant::config::load_config;

use crate::args::{CliArgs, Command};
use crate::host::Host;
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    let _logger = init_logging(
        &loaded.config.logging,
        args.log_level.as_deref(),
        Some(&loaded.paths.logs_dir),
    )?;
    let host = Host::open(&loaded)?;

    match args.command.unwrap_or(Command::Chat { message: None }) {
        Command::Chat { message } => chat::run_chat(&host, message, args.dark).await,
        Command::Ask { url, next, refresh } => {
            widget::run_ask(&host, &url, &next, refresh, args.dark).await
        }
        Command::Settings { action } => settings::run_settings(&host, action).await,
        Command::Hook { event } => hooks::run_hook(&host, event).await,
    }
}
