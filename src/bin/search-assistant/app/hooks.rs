use search_assistant::lifecycle::{handle_event, LifecycleEvent, RuntimeMessage};

use crate::args::HookCommand;
use crate::host::Host;

pub async fn run_hook(host: &Host, event: HookCommand) -> anyhow::Result<()> {
    let event = match event {
        HookCommand::Installed => LifecycleEvent::Installed,
        HookCommand::Updated { previous } => LifecycleEvent::Updated {
            previous_version: previous,
        },
        HookCommand::Action => LifecycleEvent::ActionClicked,
        HookCommand::Message { action } => LifecycleEvent::Message(RuntimeMessage { action }),
    };
    for action in handle_event(&event, &host.settings).await {
        host.perform(action);
    }
    Ok(())
}
