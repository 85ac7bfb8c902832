use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, Result};
use crate::state::{InMemoryKv, KeyValueStore, SledKv};
use std::sync::Arc;

/// Create the persistent medium based on configuration
pub fn create_backend(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = SledKv::new(path)?;
            Ok(Arc::new(store))
        }

        StorageBackend::Memory => Ok(create_in_memory_backend()),
    }
}

/// Create an in-memory medium (for testing and development)
pub fn create_in_memory_backend() -> Arc<dyn KeyValueStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryKv::new())
}
