//! In-memory `NodeStore` used for tests and ephemeral servers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::db::{NodeStore, StoreError};
use crate::models::{DeleteResult, NodeRecord, NodeType};

/// `NodeStore` backed by a `HashMap` behind a `RwLock`.
///
/// The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, NodeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`, bypassing any hierarchy rules.
    ///
    /// Lets tests set up states the service would never produce (shared children,
    /// cycles, dangling ids).
    pub fn with_records(records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let nodes = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, StoreError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StoreError::lock_poisoned("memory store read"))?;
        Ok(nodes.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>, StoreError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StoreError::lock_poisoned("memory store read"))?;

        Ok(nodes.get(id).cloned())
    }

    async fn get_nodes_by_type(&self, node_type: NodeType) -> Result<Vec<NodeRecord>, StoreError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StoreError::lock_poisoned("memory store read"))?;

        let mut matching: Vec<NodeRecord> = nodes
            .values()
            .filter(|record| record.node_type == node_type)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(matching)
    }

    async fn save_node(&self, record: NodeRecord) -> Result<(), StoreError> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| StoreError::lock_poisoned("memory store write"))?;

        nodes.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| StoreError::lock_poisoned("memory store write"))?;

        Ok(match nodes.remove(id) {
            Some(_) => DeleteResult::existed(),
            None => DeleteResult::not_found(),
        })
    }
}
