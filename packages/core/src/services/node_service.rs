//! Node Service - Tree Mutations
//!
//! This module provides the business logic layer for the network hierarchy:
//!
//! - Creation of whole subtrees, skipping ids that already exist
//! - Reads that hydrate stored records back into nested `Node`s
//! - Single-node and whole-subtree field updates
//! - Child attachment with terminal-type checks
//! - Cascading deletes
//! - Hierarchy validation (delegated to `HierarchyValidator`)
//!
//! # Storage Model
//!
//! The store holds one flat `NodeRecord` per node; parents reference children by
//! id. Every walk below resolves those ids through the store one level at a time.
//! A walk never follows an id twice, so shared children and cycles written by other
//! tools cannot make it loop.
//!
//! # Concurrency
//!
//! Mutating operations hold `write_lock` for their whole check-then-write sequence,
//! which serialises writers sharing this service (and its clones). Separate
//! processes or independently constructed services over the same store are not
//! coordinated.

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::db::{DomainEvent, NodeStore};
use crate::models::{Node, NodeRecord, NodeType};
use crate::services::error::NodeServiceError;
use crate::services::hierarchy_validator::{HierarchyValidator, ValidationReport};

/// Broadcast channel capacity for domain events.
///
/// Large subtree creates emit one event per node; lagging observers only lose
/// history, never the current state.
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Outcome of a create or add-children call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReport {
    /// Ids stored by this call, children before their parent
    pub created: Vec<String>,
    /// Ids skipped because they already existed (their payload subtrees were skipped too)
    pub conflicts: Vec<String>,
}

impl CreateReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Outcome of a whole-subtree update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    /// Ids whose fields were overwritten
    pub updated: Vec<String>,
    /// Ids whose fields already matched the payload
    pub unchanged: Vec<String>,
    /// Payload ids with no matching stored child (skipped with their payload subtree)
    pub unmatched: Vec<String>,
}

/// Outcome of a cascading delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    /// Every removed id, descendants before ancestors
    pub deleted: Vec<String>,
    /// Remaining nodes that referenced the deleted root and were rewritten without it
    pub detached_from: Vec<String>,
}

/// Core service for network tree operations
///
/// Cheap to clone: clones share the store, the event channel and the write lock.
///
/// # Examples
///
/// ```rust
/// use netgraph_core::db::MemoryStore;
/// use netgraph_core::models::{Node, NodeType};
/// use netgraph_core::services::NodeService;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), netgraph_core::services::NodeServiceError> {
/// let service = NodeService::new(Arc::new(MemoryStore::new()));
///
/// let network = Node::new("n1", NodeType::Network, "Office")
///     .with_child(Node::new("c1", NodeType::Node, "Router"));
/// let report = service.create_network(network).await?;
///
/// assert_eq!(report.created, vec!["c1", "n1"]);
/// assert!(service.validate_network("n1").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NodeService {
    store: Arc<dyn NodeStore>,
    validator: HierarchyValidator,
    event_tx: broadcast::Sender<DomainEvent>,
    write_lock: Arc<Mutex<()>>,
}

impl NodeService {
    /// Create a new NodeService over `store`
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            validator: HierarchyValidator::new(store.clone()),
            store,
            event_tx,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Subscribe to domain events
    ///
    /// Returns a broadcast receiver that sees every event emitted after this call.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors: having no subscribers is normal.
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    //
    // CREATE
    //

    /// Create `node` and its whole subtree.
    ///
    /// Children are stored before their parent. An id that already exists is
    /// reported in `conflicts` and neither it nor anything below it in the payload is
    /// written; its siblings and ancestors still are, and the ancestor does not link
    /// to it.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if any payload node lacks an id or name (nothing is
    /// written); store failures are propagated.
    pub async fn create_node(&self, node: Node) -> Result<CreateReport, NodeServiceError> {
        node.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut report = CreateReport::default();
        let mut claimed = HashSet::new();
        self.create_subtree(&node, &mut claimed, &mut report).await?;

        if report.created.is_empty() {
            tracing::error!(node_id = %node.id, "Nothing created, id already exists");
        } else {
            tracing::info!(
                node_id = %node.id,
                created = report.created.len(),
                conflicts = report.conflicts.len(),
                "Node tree created"
            );
        }
        Ok(report)
    }

    /// Create a network: like [`create_node`](Self::create_node) but the root must be
    /// of type `NETWORK`.
    pub async fn create_network(&self, node: Node) -> Result<CreateReport, NodeServiceError> {
        if !node.node_type.is_root() {
            tracing::warn!(
                node_id = %node.id,
                node_type = %node.node_type,
                "Tried to create network from non-network node"
            );
            return Err(NodeServiceError::structural_misuse(format!(
                "network root {} must be of type {}, got {}",
                node.id,
                NodeType::Network,
                node.node_type
            )));
        }
        self.create_node(node).await
    }

    /// Returns whether `node` itself was stored.
    ///
    /// `claimed` holds every id already taken by this call, so an id repeated inside
    /// one payload is a conflict rather than an overwrite of the earlier node.
    fn create_subtree<'a>(
        &'a self,
        node: &'a Node,
        claimed: &'a mut HashSet<String>,
        report: &'a mut CreateReport,
    ) -> BoxFuture<'a, Result<bool, NodeServiceError>> {
        async move {
            if !claimed.insert(node.id.clone()) {
                tracing::error!(node_id = %node.id, "Id repeated within one payload");
                report.conflicts.push(node.id.clone());
                return Ok(false);
            }
            if self.store.get_node(&node.id).await?.is_some() {
                tracing::error!(
                    node_id = %node.id,
                    "Tried to create node with id that already exists"
                );
                report.conflicts.push(node.id.clone());
                return Ok(false);
            }

            let mut record = NodeRecord::detached(node);
            for child in &node.children {
                if self
                    .create_subtree(child, &mut *claimed, &mut *report)
                    .await?
                {
                    record.child_ids.push(child.id.clone());
                }
            }

            self.store.save_node(record.clone()).await?;
            tracing::debug!(node_id = %node.id, "Node stored");
            report.created.push(node.id.clone());
            self.emit_event(DomainEvent::NodeCreated(record));
            Ok(true)
        }
        .boxed()
    }

    //
    // READ
    //

    /// All `NETWORK` nodes ordered by id, each with its full subtree
    pub async fn get_networks(&self) -> Result<Vec<Node>, NodeServiceError> {
        let records = self.store.get_nodes_by_type(NodeType::Network).await?;
        tracing::info!(count = records.len(), "All networks were requested");

        let mut networks = Vec::with_capacity(records.len());
        for record in records {
            networks.push(self.hydrate_root(record).await?);
        }
        Ok(networks)
    }

    /// Get the node at `id` with its full subtree, or `None` if absent
    pub async fn get_node(&self, id: &str) -> Result<Option<Node>, NodeServiceError> {
        match self.store.get_node(id).await? {
            Some(record) => Ok(Some(self.hydrate_root(record).await?)),
            None => {
                tracing::error!(node_id = %id, "Node was not found");
                Ok(None)
            }
        }
    }

    /// Children of the node at `id`, each with its full subtree
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if the parent does not exist
    pub async fn get_children(&self, parent_id: &str) -> Result<Vec<Node>, NodeServiceError> {
        let parent = self.require_node(parent_id).await?;
        tracing::info!(node_id = %parent_id, "Children were requested");
        Ok(self.hydrate_root(parent).await?.children)
    }

    async fn require_node(&self, id: &str) -> Result<NodeRecord, NodeServiceError> {
        self.store.get_node(id).await?.ok_or_else(|| {
            tracing::error!(node_id = %id, "Node was not found");
            NodeServiceError::node_not_found(id)
        })
    }

    async fn hydrate_root(&self, record: NodeRecord) -> Result<Node, NodeServiceError> {
        let mut seen = HashSet::new();
        seen.insert(record.id.clone());
        self.hydrate(record, &mut seen).await
    }

    /// Resolve `record.child_ids` recursively into nested nodes.
    fn hydrate<'a>(
        &'a self,
        record: NodeRecord,
        seen: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, Result<Node, NodeServiceError>> {
        async move {
            let mut children = Vec::with_capacity(record.child_ids.len());

            for child_id in &record.child_ids {
                if !seen.insert(child_id.clone()) {
                    tracing::warn!(
                        parent_id = %record.id,
                        child_id = %child_id,
                        "Child reached twice, not expanding it again"
                    );
                    continue;
                }

                match self.store.get_node(child_id).await? {
                    Some(child) => children.push(self.hydrate(child, &mut *seen).await?),
                    None => tracing::warn!(
                        parent_id = %record.id,
                        child_id = %child_id,
                        "Skipping dangling child reference"
                    ),
                }
            }

            Ok(record.into_node(children))
        }
        .boxed()
    }

    //
    // UPDATE
    //

    /// Overwrite name, description, params and type of the node at `id` from
    /// `new_node`. The id and the children are never changed.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node exists at `id`
    pub async fn update_node(&self, id: &str, new_node: &Node) -> Result<Node, NodeServiceError> {
        let _guard = self.write_lock.lock().await;

        let mut record = self.require_node(id).await?;
        record.apply_fields(new_node);
        self.store.save_node(record.clone()).await?;
        self.emit_event(DomainEvent::NodeUpdated(record.clone()));
        tracing::info!(node_id = %id, "Node updated");

        self.hydrate_root(record).await
    }

    /// Apply the fields of a whole payload tree to the stored subtree at `id`.
    ///
    /// The payload root addresses the node at `id` whatever its own id says. Each
    /// payload child addresses the stored child *with the same id* of the node its
    /// parent was matched to; a payload child with no such stored child is reported
    /// in `unmatched` and skipped along with its payload subtree. Children are
    /// processed before their parent, and a node whose fields already match is
    /// left untouched. No children are ever added or removed.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node exists at `id`
    pub async fn update_network(
        &self,
        id: &str,
        node: &Node,
    ) -> Result<UpdateReport, NodeServiceError> {
        let _guard = self.write_lock.lock().await;

        let root = self.require_node(id).await?;
        tracing::info!(node_id = %id, "Network is updating");

        let mut report = UpdateReport::default();
        let mut seen = HashSet::new();
        seen.insert(root.id.clone());
        self.update_subtree(root, node, &mut seen, &mut report).await?;

        tracing::info!(
            node_id = %id,
            updated = report.updated.len(),
            unmatched = report.unmatched.len(),
            "Network updated"
        );
        Ok(report)
    }

    fn update_subtree<'a>(
        &'a self,
        mut record: NodeRecord,
        node: &'a Node,
        seen: &'a mut HashSet<String>,
        report: &'a mut UpdateReport,
    ) -> BoxFuture<'a, Result<(), NodeServiceError>> {
        async move {
            for child in &node.children {
                if !record.has_child(&child.id) {
                    tracing::warn!(
                        parent_id = %record.id,
                        child_id = %child.id,
                        "Supplied child is not a child of the stored node, skipping"
                    );
                    report.unmatched.push(child.id.clone());
                    continue;
                }
                if !seen.insert(child.id.clone()) {
                    tracing::warn!(node_id = %child.id, "Child supplied twice, skipping");
                    report.unmatched.push(child.id.clone());
                    continue;
                }

                match self.store.get_node(&child.id).await? {
                    Some(stored_child) => {
                        self.update_subtree(stored_child, child, &mut *seen, &mut *report)
                            .await?
                    }
                    None => {
                        tracing::warn!(
                            parent_id = %record.id,
                            child_id = %child.id,
                            "Skipping dangling child reference"
                        );
                        report.unmatched.push(child.id.clone());
                    }
                }
            }

            if record.fields_match(node) {
                report.unchanged.push(record.id);
                return Ok(());
            }

            record.apply_fields(node);
            self.store.save_node(record.clone()).await?;
            report.updated.push(record.id.clone());
            self.emit_event(DomainEvent::NodeUpdated(record));
            Ok(())
        }
        .boxed()
    }

    //
    // ADD CHILDREN
    //

    /// Create `children` as new subtrees and append them to the node at `id`.
    ///
    /// Each child goes through the same conflict rules as
    /// [`create_node`](Self::create_node); only children that were actually created
    /// are appended. The parent itself is saved directly, so the fact that it
    /// already exists is not a conflict.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if no node exists at `id`
    /// - `StructuralMisuse` if the parent's type is terminal (nothing is written)
    /// - `ValidationFailed` if any payload node lacks an id or name
    pub async fn add_children(
        &self,
        id: &str,
        children: Vec<Node>,
    ) -> Result<CreateReport, NodeServiceError> {
        for child in &children {
            child.validate()?;
        }
        let _guard = self.write_lock.lock().await;

        let mut parent = self.require_node(id).await?;
        if parent.node_type.is_terminal() {
            tracing::warn!(
                node_id = %id,
                node_type = %parent.node_type,
                "Tried to add children to terminal node"
            );
            return Err(NodeServiceError::structural_misuse(format!(
                "cannot add children to {} node {}",
                parent.node_type, id
            )));
        }

        let mut report = CreateReport::default();
        let mut claimed = HashSet::from([parent.id.clone()]);
        let mut attached = Vec::new();
        for child in &children {
            if self.create_subtree(child, &mut claimed, &mut report).await? {
                parent.child_ids.push(child.id.clone());
                attached.push(child.id.clone());
            }
        }

        if !attached.is_empty() {
            self.store.save_node(parent).await?;
            self.emit_event(DomainEvent::ChildrenAdded {
                parent_id: id.to_string(),
                child_ids: attached.clone(),
            });
        }

        tracing::info!(
            node_id = %id,
            attached = attached.len(),
            conflicts = report.conflicts.len(),
            "Children were added"
        );
        Ok(report)
    }

    //
    // DELETE
    //

    /// Delete the node at `id` and every stored descendant, descendants first.
    ///
    /// Nodes that listed `id` as a child are rewritten without it.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node exists at `id` (nothing is deleted)
    pub async fn delete_node(&self, id: &str) -> Result<DeleteReport, NodeServiceError> {
        let _guard = self.write_lock.lock().await;

        let record = self.require_node(id).await?;
        self.delete_tree(record).await
    }

    /// Delete a network: like [`delete_node`](Self::delete_node) but only for nodes
    /// of type `NETWORK`.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if no node exists at `id`
    /// - `StructuralMisuse` if the node is not a network (nothing is deleted)
    pub async fn delete_network(&self, id: &str) -> Result<DeleteReport, NodeServiceError> {
        let _guard = self.write_lock.lock().await;

        let record = self.require_node(id).await?;
        if !record.node_type.is_root() {
            tracing::warn!(
                node_id = %id,
                node_type = %record.node_type,
                "Tried to delete non-network node via network link"
            );
            return Err(NodeServiceError::structural_misuse(format!(
                "{} is a {} node, not a {}",
                id,
                record.node_type,
                NodeType::Network
            )));
        }

        self.delete_tree(record).await
    }

    /// Caller must hold `write_lock`.
    async fn delete_tree(&self, record: NodeRecord) -> Result<DeleteReport, NodeServiceError> {
        let root_id = record.id.clone();

        let mut report = DeleteReport::default();
        let mut seen = HashSet::new();
        seen.insert(root_id.clone());
        self.delete_subtree(record, &mut seen, &mut report).await?;
        report.detached_from = self.detach_from_parents(&root_id).await?;

        tracing::info!(
            node_id = %root_id,
            deleted = report.deleted.len(),
            "Node was deleted"
        );
        Ok(report)
    }

    fn delete_subtree<'a>(
        &'a self,
        record: NodeRecord,
        seen: &'a mut HashSet<String>,
        report: &'a mut DeleteReport,
    ) -> BoxFuture<'a, Result<(), NodeServiceError>> {
        async move {
            for child_id in &record.child_ids {
                if !seen.insert(child_id.clone()) {
                    continue;
                }
                match self.store.get_node(child_id).await? {
                    Some(child) => self.delete_subtree(child, &mut *seen, &mut *report).await?,
                    None => tracing::warn!(
                        parent_id = %record.id,
                        child_id = %child_id,
                        "Child to delete does not exist"
                    ),
                }
            }

            if self.store.delete_node(&record.id).await?.existed {
                tracing::debug!(node_id = %record.id, "Node removed");
                self.emit_event(DomainEvent::NodeDeleted {
                    id: record.id.clone(),
                });
                report.deleted.push(record.id);
            }
            Ok(())
        }
        .boxed()
    }

    /// Remove `id` from every remaining node's child list.
    async fn detach_from_parents(&self, id: &str) -> Result<Vec<String>, NodeServiceError> {
        let mut detached = Vec::new();

        for node_type in NodeType::ALL {
            for mut record in self.store.get_nodes_by_type(node_type).await? {
                if !record.has_child(id) {
                    continue;
                }
                record.child_ids.retain(|child_id| child_id != id);
                detached.push(record.id.clone());
                self.store.save_node(record.clone()).await?;
                self.emit_event(DomainEvent::NodeUpdated(record));
            }
        }

        Ok(detached)
    }

    //
    // VALIDATION
    //

    /// Whether the subtree at `id` has unique ids and a consistent type ordering
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node exists at `id`
    pub async fn validate_network(&self, id: &str) -> Result<bool, NodeServiceError> {
        tracing::info!(node_id = %id, "Network validating");
        Ok(self.validator.validate(id).await?.is_valid())
    }

    /// Full validation report for the subtree at `id`
    pub async fn validation_report(&self, id: &str) -> Result<ValidationReport, NodeServiceError> {
        self.validator.validate(id).await
    }
}
