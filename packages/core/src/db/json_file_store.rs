//! JSON-file `NodeStore`
//!
//! Keeps every record in memory and rewrites the whole file after each change. The
//! file is a single JSON object mapping node id to record.
//!
//! Writes use the write-to-temp-then-rename pattern so a crash mid-write leaves the
//! previous file intact.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::db::{NodeStore, StoreError};
use crate::models::{DeleteResult, NodeRecord, NodeType};

/// File-backed `NodeStore`
///
/// The mutex is held across the file write so the file always matches the map.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    nodes: Mutex<BTreeMap<String, NodeRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing records.
    ///
    /// A missing file is an empty store; parent directories are created on first
    /// write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let nodes = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        tracing::debug!(path = %path.display(), records = nodes.len(), "Opened JSON file store");

        Ok(Self {
            path,
            nodes: Mutex::new(nodes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, nodes: &BTreeMap<String, NodeRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let serialized = serde_json::to_string_pretty(nodes)?;

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, serialized)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        Ok(())
    }
}

#[async_trait]
impl NodeStore for JsonFileStore {
    async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>, StoreError> {
        Ok(self.nodes.lock().await.get(id).cloned())
    }

    async fn get_nodes_by_type(&self, node_type: NodeType) -> Result<Vec<NodeRecord>, StoreError> {
        // BTreeMap iteration is already ordered by id
        Ok(self
            .nodes
            .lock()
            .await
            .values()
            .filter(|record| record.node_type == node_type)
            .cloned()
            .collect())
    }

    async fn save_node(&self, record: NodeRecord) -> Result<(), StoreError> {
        let mut nodes = self.nodes.lock().await;
        let previous = nodes.insert(record.id.clone(), record.clone());

        if let Err(e) = self.persist(&nodes).await {
            // Keep memory and file in agreement
            match previous {
                Some(previous) => nodes.insert(record.id, previous),
                None => nodes.remove(&record.id),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let mut nodes = self.nodes.lock().await;
        let Some(removed) = nodes.remove(id) else {
            return Ok(DeleteResult::not_found());
        };

        if let Err(e) = self.persist(&nodes).await {
            nodes.insert(removed.id.clone(), removed);
            return Err(e);
        }
        Ok(DeleteResult::existed())
    }
}
