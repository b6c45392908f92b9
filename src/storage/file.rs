use std::fs;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::StorageArea;
use crate::error::AssistantError;

/// Storage area persisted as a single JSON object on disk.
///
/// The whole object is rewritten on every mutation. A missing file reads as
/// an empty area.
#[derive(Debug)]
pub struct JsonFileArea {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileArea {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Map<String, Value>, AssistantError> {
        match fs::read(&self.path) {
            Ok(data) if data.is_empty() => Ok(Map::new()),
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, items: &Map<String, Value>) -> Result<(), AssistantError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(items)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn mutate(
        &self,
        apply: impl FnOnce(&mut Map<String, Value>),
    ) -> Result<(), AssistantError> {
        let _guard = self.lock.lock();
        let mut items = self.read()?;
        apply(&mut items);
        self.write(&items)
    }
}

#[async_trait]
impl StorageArea for JsonFileArea {
    async fn get_all(&self) -> Result<Map<String, Value>, AssistantError> {
        let _guard = self.lock.lock();
        self.read()
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), AssistantError> {
        self.mutate(|current| current.extend(items))
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), AssistantError> {
        self.mutate(|current| {
            for key in keys {
                current.remove(*key);
            }
        })
    }

    async fn clear(&self) -> Result<(), AssistantError> {
        self.mutate(|current| current.clear())
    }
}
