use crate::error::{AppError, Result};
use crate::state::KeyValueStore;
use std::path::Path;

/// Persistent medium using the Sled embedded database
#[derive(Clone)]
pub struct SledKv {
    collections_tree: sled::Tree,
}

impl SledKv {
    /// Open (or create) a Sled database at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(path_str).map_err(|e| {
            AppError::Storage(format!("Failed to open Sled database: {}", e))
        })?;

        let collections_tree = db.open_tree("collections").map_err(|e| {
            AppError::Storage(format!("Failed to open collections tree: {}", e))
        })?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self { collections_tree })
    }
}

impl KeyValueStore for SledKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.collections_tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                key, e
            ))),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.collections_tree
            .insert(key.as_bytes(), value)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))?;

        // Flush to ensure durability
        self.collections_tree.flush().map_err(|e| {
            AppError::Storage(format!("Failed to flush collections tree: {}", e))
        })?;

        tracing::debug!(key, bytes = value.len(), "Value written to Sled");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sled"
    }
}
