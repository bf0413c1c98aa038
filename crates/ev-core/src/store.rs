//! In-process `KeyValueStore`. Contents live as long as the value does,
//! like a browser's session storage.

use crate::traits::KeyValueStore;
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get_item("token").await.unwrap().is_none());

        store.set_item("token", "abc").await.unwrap();
        store.set_item("token", "def").await.unwrap();
        assert_eq!(store.get_item("token").await.unwrap().as_deref(), Some("def"));

        store.remove_item("token").await.unwrap();
        assert!(store.get_item("token").await.unwrap().is_none());
    }
}
