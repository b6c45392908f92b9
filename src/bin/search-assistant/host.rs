use std::sync::Arc;

use search_assistant::config::{ClientConfig, LoadedConfig};
use search_assistant::lifecycle::HostAction;
use search_assistant::{ChatHistoryStore, JsonFileArea, RelayClient, SettingsStore};

const SYNC_AREA_FILE: &str = "sync.json";
const LOCAL_AREA_FILE: &str = "local.json";

/// Storage, relay client and host actions for the terminal.
pub struct Host {
    pub settings: SettingsStore,
    pub history: ChatHistoryStore,
    pub relay: Arc<RelayClient>,
    pub client: ClientConfig,
}

impl Host {
    pub fn open(loaded: &LoadedConfig) -> anyhow::Result<Self> {
        let dir = loaded
            .config
            .storage
            .dir
            .clone()
            .unwrap_or_else(|| loaded.paths.storage_dir());
        log::debug!("Storage areas under {}", dir.display());

        let sync = Arc::new(JsonFileArea::new(dir.join(SYNC_AREA_FILE)));
        let local = Arc::new(JsonFileArea::new(dir.join(LOCAL_AREA_FILE)));
        let client = loaded.config.client.clone();
        Ok(Self {
            settings: SettingsStore::new(sync),
            history: ChatHistoryStore::new(local),
            relay: Arc::new(RelayClient::new(&client)?),
            client,
        })
    }

    pub fn perform(&self, action: HostAction) {
        match action {
            HostAction::OpenSettings => {
                println!("Settings: `search-assistant settings show`, `search-assistant settings set <field> <value>`");
            }
        }
    }
}
