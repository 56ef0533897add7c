//! Domain Events
//!
//! Events emitted by `NodeService` after each successful write. They follow the
//! observer pattern: subscribers receive them through a tokio broadcast channel
//! and never influence the operation that produced them.

use crate::models::NodeRecord;

/// Domain events emitted by `NodeService`
///
/// These represent tree-level changes, one event per stored entry touched.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A new node was stored
    NodeCreated(NodeRecord),

    /// An existing node's fields were overwritten
    NodeUpdated(NodeRecord),

    /// A node entry was removed
    NodeDeleted { id: String },

    /// New child subtrees were attached under `parent_id`
    ChildrenAdded {
        parent_id: String,
        child_ids: Vec<String>,
    },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodeDeleted { .. } => "node:deleted",
            DomainEvent::ChildrenAdded { .. } => "node:children-added",
        }
    }

    /// Id of the node this event is about
    pub fn node_id(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(record) | DomainEvent::NodeUpdated(record) => &record.id,
            DomainEvent::NodeDeleted { id } => id,
            DomainEvent::ChildrenAdded { parent_id, .. } => parent_id,
        }
    }
}
