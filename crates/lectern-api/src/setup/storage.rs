//! Storage backend setup

use anyhow::{Context, Result};
use lectern_core::{Config, StorageBackend};
use lectern_services::{create_storage, Storage};
use lectern_storage::MemoryStorage;
use std::sync::Arc;

pub struct StorageHandles {
    pub storage: Arc<dyn Storage>,
    /// Set when the API itself serves the signed storage routes.
    pub memory: Option<Arc<MemoryStorage>>,
}

/// Build the configured storage backend
pub fn setup_storage(config: &Config) -> Result<StorageHandles> {
    let handles = match config.storage_backend() {
        StorageBackend::Memory => {
            let memory = Arc::new(MemoryStorage::new(&config.storage));
            StorageHandles {
                storage: memory.clone(),
                memory: Some(memory),
            }
        }
        backend => StorageHandles {
            storage: create_storage(backend, &config.storage)
                .context("Failed to initialize object storage")?,
            memory: None,
        },
    };

    tracing::info!(
        backend = %handles.storage.backend_type(),
        bucket = %handles.storage.bucket(),
        endpoint = %config.storage.endpoint_base(),
        "Storage initialized"
    );

    Ok(handles)
}
