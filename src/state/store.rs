use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Trait for the persistent key-value medium backing the tracker
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Keys of the three persisted collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub incidents: String,
    pub content_blocks: String,
    pub settings: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            incidents: format!("{}_incidents", prefix),
            content_blocks: format!("{}_content_blocks", prefix),
            settings: format!("{}_settings", prefix),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix("kalium")
    }
}

/// In-memory medium (for tests and throwaway sessions)
#[derive(Clone, Default)]
pub struct InMemoryKv {
    entries: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        tracing::trace!(key, bytes = value.len(), "Value stored in memory");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        let keys = StorageKeys::default();
        assert_eq!(keys.incidents, "kalium_incidents");
        assert_eq!(keys.content_blocks, "kalium_content_blocks");
        assert_eq!(keys.settings, "kalium_settings");

        assert_eq!(StorageKeys::with_prefix("dev").settings, "dev_settings");
    }

    #[test]
    fn test_in_memory_put_and_get() {
        let kv = InMemoryKv::new();
        assert!(kv.is_empty());
        assert!(kv.get("missing").unwrap().is_none());

        kv.put("a", b"[1]").unwrap();
        kv.put("a", b"[2]").unwrap();

        assert_eq!(kv.get("a").unwrap().as_deref(), Some(&b"[2]"[..]));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let kv = InMemoryKv::new();
        let other = kv.clone();
        kv.put("k", b"v").unwrap();
        assert!(other.get("k").unwrap().is_some());
    }
}
