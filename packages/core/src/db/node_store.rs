//! NodeStore Trait - Store Abstraction Layer
//!
//! This module defines the `NodeStore` trait, the only boundary the tree engine
//! depends on. A store is a flat key-value map from node id to [`NodeRecord`]; it
//! knows nothing about hierarchy rules.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so file and network backed stores fit
//!    behind the same trait as the in-memory one
//! 2. **Ownership Semantics**: `save_node` takes the record by value
//! 3. **No cascading**: `delete_node` removes exactly one entry; walking descendants
//!    is the service's job
//!
//! # Examples
//!
//! ```rust
//! use netgraph_core::db::{MemoryStore, NodeStore};
//! use netgraph_core::models::{Node, NodeRecord, NodeType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netgraph_core::db::StoreError> {
//!     let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
//!
//!     let record = NodeRecord::from_node(&Node::new("n1", NodeType::Network, "Office"));
//!     store.save_node(record).await?;
//!
//!     assert!(store.get_node("n1").await?.is_some());
//!     Ok(())
//! }
//! ```

use crate::db::StoreError;
use crate::models::{DeleteResult, NodeRecord, NodeType};
use async_trait::async_trait;

/// Abstraction layer for node persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single store can be shared by every
/// clone of the service and by concurrent HTTP handlers.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get node by ID
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if the node exists
    /// - `Ok(None)` if it doesn't (not an error)
    /// - `Err(_)` if the store itself failed
    async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>, StoreError>;

    /// Get every node of one type, ordered by id
    async fn get_nodes_by_type(&self, node_type: NodeType) -> Result<Vec<NodeRecord>, StoreError>;

    /// Insert or replace the entry keyed by `record.id`
    async fn save_node(&self, record: NodeRecord) -> Result<(), StoreError>;

    /// Remove the single entry keyed by `id`
    ///
    /// Deleting a missing id succeeds with `existed == false`.
    async fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError>;
}
