//! Key-value storage areas standing in for the extension host's `sync` and
//! `local` stores.
//!
//! Every area holds a flat JSON object. Writes merge the given keys over the
//! current contents; nothing finer-grained than a whole value is ever mutated.

mod file;
mod memory;

pub use file::JsonFileArea;
pub use memory::MemoryArea;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AssistantError;

/// A scoped key-value store.
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Returns every stored key.
    async fn get_all(&self) -> Result<Map<String, Value>, AssistantError>;

    /// Overwrites the given keys, leaving the others untouched.
    async fn set(&self, items: Map<String, Value>) -> Result<(), AssistantError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), AssistantError>;

    async fn clear(&self) -> Result<(), AssistantError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, AssistantError> {
        Ok(self.get_all().await?.remove(key))
    }

    async fn set_one(&self, key: &str, value: Value) -> Result<(), AssistantError> {
        let mut items = Map::new();
        items.insert(key.to_string(), value);
        self.set(items).await
    }
}
