//! Host lifecycle hooks: install/update notifications, the toolbar action and
//! runtime messages. Every one of them boils down to "open the settings page".

use serde::Deserialize;

use crate::settings::SettingsStore;

/// Runtime message action asking for the settings page.
pub const OPEN_OPTIONS_ACTION: &str = "openOptions";

/// Something the host should do on the controllers' behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    OpenSettings,
}

/// A message sent from a content script or popup to the background.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeMessage {
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Installed,
    Updated { previous_version: Option<String> },
    ActionClicked,
    Message(RuntimeMessage),
}

/// Handles one lifecycle event and returns what the host has to do.
pub async fn handle_event(event: &LifecycleEvent, store: &SettingsStore) -> Vec<HostAction> {
    match event {
        LifecycleEvent::Installed => {
            if let Err(err) = store.set_first_install(true).await {
                log::warn!("Could not record first install: {err}");
            }
            vec![HostAction::OpenSettings]
        }
        LifecycleEvent::Updated { previous_version } => {
            log::info!("Updated from {}", previous_version.as_deref().unwrap_or("unknown"));
            Vec::new()
        }
        LifecycleEvent::ActionClicked => vec![HostAction::OpenSettings],
        LifecycleEvent::Message(message) if message.action == OPEN_OPTIONS_ACTION => {
            vec![HostAction::OpenSettings]
        }
        LifecycleEvent::Message(message) => {
            log::debug!("Ignoring runtime message {}", message.action);
            Vec::new()
        }
    }
}
