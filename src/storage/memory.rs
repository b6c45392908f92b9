use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::StorageArea;
use crate::error::AssistantError;

/// In-process storage area.
///
/// Writes can be made to fail on demand, which lets callers exercise their
/// persistence-error paths.
#[derive(Debug, Default)]
pub struct MemoryArea {
    items: Mutex<Map<String, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Map<String, Value>) -> Self {
        Self {
            items: Mutex::new(items),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), AssistantError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AssistantError::Persistence("persist failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageArea for MemoryArea {
    async fn get_all(&self) -> Result<Map<String, Value>, AssistantError> {
        Ok(self.items.lock().clone())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), AssistantError> {
        self.check_writable()?;
        self.items.lock().extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), AssistantError> {
        self.check_writable()?;
        let mut guard = self.items.lock();
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), AssistantError> {
        self.check_writable()?;
        self.items.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_merges_over_existing_keys() {
        let area = MemoryArea::new();
        area.set_one("a", json!(1)).await.expect("set a");
        area.set_one("b", json!(2)).await.expect("set b");
        area.set_one("a", json!(3)).await.expect("overwrite a");

        let all = area.get_all().await.expect("get_all");
        assert_eq!(all.get("a"), Some(&json!(3)));
        assert_eq!(all.get("b"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn failing_writes_leave_contents_untouched() {
        let area = MemoryArea::new();
        area.set_one("a", json!(1)).await.expect("set");
        area.fail_writes(true);

        assert!(area.set_one("a", json!(2)).await.is_err());
        assert!(area.clear().await.is_err());
        assert_eq!(area.get("a").await.expect("get"), Some(json!(1)));
    }
}
