use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "search-assistant",
    about = "Terminal front-end for the AI search assistant"
)]
pub struct CliArgs {
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Resolve the `auto` theme as dark
    #[arg(long, global = true)]
    pub dark: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with the assistant; interactive when no message is given
    Chat { message: Option<String> },
    /// Show the answer widget for a search results URL, then for each
    /// following URL as if the page navigated there
    Ask {
        url: String,
        next: Vec<String>,
        /// Ask again even when auto-show did not
        #[arg(long)]
        refresh: bool,
    },
    /// Inspect or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Run a lifecycle hook
    Hook {
        #[command(subcommand)]
        event: HookCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Set one field, e.g. `set theme dark` or `set apiKey fw-...`
    Set { field: String, value: String },
    /// Restore every setting to its default
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Send a test query with the saved API key
    Test,
    /// Hide the first-run welcome banner
    Dismiss,
}

#[derive(Subcommand, Debug)]
pub enum HookCommand {
    Installed,
    Updated {
        #[arg(long)]
        previous: Option<String>,
    },
    Action,
    Message { action: String },
}
