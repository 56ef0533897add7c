//! Store Layer
//!
//! This module holds everything between the tree engine and durable storage:
//!
//! - `NodeStore` - the four-operation key-value contract the engine depends on
//! - `MemoryStore` - in-process store for tests and ephemeral servers
//! - `JsonFileStore` - single-file store with atomic rewrites
//! - `DomainEvent` - change notifications emitted by the service layer
//!
//! Stores hold flat `NodeRecord`s. Hierarchy rules live in `services`.

mod error;
pub mod events;
mod json_file_store;
mod memory_store;
mod node_store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use node_store::NodeStore;

use crate::config::{StorageBackend, StorageConfig};
use std::sync::Arc;

/// Open the store selected by `config`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn NodeStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory node store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::JsonFile => {
            let path = config
                .resolve_path()
                .map_err(|e| StoreError::io(config.path.clone().unwrap_or_default(), e))?;
            tracing::info!(path = %path.display(), "Using JSON file node store");
            Ok(Arc::new(JsonFileStore::open(path).await?))
        }
    }
}
