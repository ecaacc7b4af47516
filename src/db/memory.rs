use std::{collections::HashMap, future::Future, sync::Arc};

use anyhow::Result;
use tokio::sync::Mutex;

use super::KeyValueStore;

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        async move { Ok(self.entries.lock().await.get(key).cloned()) }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.entries.lock().await.insert(key.to_string(), value);
            Ok(())
        }
    }

    fn update<F>(&self, key: &str, apply: F) -> impl Future<Output = Result<String>> + Send
    where
        F: FnOnce(Option<String>) -> Result<String> + Send + 'static,
    {
        async move {
            let mut entries = self.entries.lock().await;
            let next = apply(entries.get(key).cloned())?;
            entries.insert(key.to_string(), next.clone());
            Ok(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("k", "v".into()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_value() {
        let store = MemoryStore::new();
        store.set("k", "v".into()).await.unwrap();

        let result = store.update("k", |_| anyhow::bail!("no")).await;
        assert!(result.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
