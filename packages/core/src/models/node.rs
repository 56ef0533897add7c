//! Node Data Structures
//!
//! This module defines the `NodeType` ordering, the nested `Node` payload used by
//! callers, and the flat `NodeRecord` that is actually persisted in a store.
//!
//! # Architecture
//!
//! - **Cyclic type ordering**: `NETWORK -> NODE -> RESOURCE -> NETWORK`. A child must
//!   carry the successor of its parent's type.
//! - **Nested payloads**: `Node` carries its children as full values, which is what
//!   callers send and receive.
//! - **Normalised records**: `NodeRecord` replaces embedded children with child ids, so
//!   every node has exactly one stored copy.
//!
//! # Examples
//!
//! ```rust
//! use netgraph_core::models::{Node, NodeType};
//!
//! let network = Node::new("n1", NodeType::Network, "Office")
//!     .with_child(Node::new("c1", NodeType::Node, "Router"));
//!
//! assert_eq!(network.subtree_len(), 2);
//! assert_eq!(NodeType::Network.next(), NodeType::Node);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation errors for Node payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid node type: {0}")]
    InvalidNodeType(String),
}

/// Hierarchy level of a node.
///
/// Declaration order is significant: [`NodeType::next`] walks it cyclically and
/// defines the only legal child type for each parent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Network,
    Node,
    Resource,
}

impl NodeType {
    /// Every type in hierarchy order.
    pub const ALL: [NodeType; 3] = [NodeType::Network, NodeType::Node, NodeType::Resource];

    /// Position of this type in [`NodeType::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            NodeType::Network => 0,
            NodeType::Node => 1,
            NodeType::Resource => 2,
        }
    }

    /// Cyclic successor: the type every child of a `self` node must have.
    ///
    /// The last type wraps around to the first, so `next` is total.
    ///
    /// ```rust
    /// # use netgraph_core::models::NodeType;
    /// assert_eq!(NodeType::Node.next(), NodeType::Resource);
    /// assert_eq!(NodeType::Resource.next(), NodeType::Network);
    /// ```
    pub fn next(self) -> NodeType {
        Self::ALL[(self.ordinal() + 1) % Self::ALL.len()]
    }

    /// Root-level type, the only one accepted by network-scoped operations.
    pub fn is_root(self) -> bool {
        self == NodeType::Network
    }

    /// Leaf type by convention. Nodes of this type do not accept new children.
    pub fn is_terminal(self) -> bool {
        self == NodeType::Resource
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Network => "NETWORK",
            NodeType::Node => "NODE",
            NodeType::Resource => "RESOURCE",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidNodeType(s.to_string()))
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
///
/// Payloads produced by older clients send `"children": null` for leaves.
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A node together with its full nested subtree.
///
/// This is the shape of every request payload and every read result. It is never
/// stored as-is: see [`NodeRecord`].
///
/// # Fields
///
/// - `id`: Globally unique key across the whole store
/// - `node_type`: Hierarchy level (serialized as `type`)
/// - `name`: Display label
/// - `description`: Optional free text
/// - `params`: Arbitrary string attributes
/// - `children`: Ordered child subtrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub params: HashMap<String, String>,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a childless node with no description or params.
    pub fn new(id: impl Into<String>, node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: name.into(),
            description: None,
            params: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Every id in this subtree in pre-order.
    pub fn subtree_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.subtree_len());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<String>) {
        ids.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(ids);
        }
    }

    /// Check required fields on this node and every descendant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField(format!(
                "name (node {})",
                self.id
            )));
        }
        self.children.iter().try_for_each(Node::validate)
    }
}

/// Persisted form of a node: the same fields as [`Node`] with children replaced by
/// their ids.
///
/// Each node in the store is its own record, so a child's own record is the only
/// copy of its data. Reading a subtree resolves `child_ids` through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub params: HashMap<String, String>,

    #[serde(default)]
    pub child_ids: Vec<String>,
}

impl NodeRecord {
    /// Record for `node` without any child links.
    ///
    /// Child ids are attached by the caller once each child is known to be stored.
    pub fn detached(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            node_type: node.node_type,
            name: node.name.clone(),
            description: node.description.clone(),
            params: node.params.clone(),
            child_ids: Vec::new(),
        }
    }

    /// Record for `node` linking every direct child by id.
    pub fn from_node(node: &Node) -> Self {
        let mut record = Self::detached(node);
        record.child_ids = node.children.iter().map(|c| c.id.clone()).collect();
        record
    }

    /// Whether the mutable fields (type, name, description, params) equal `node`'s.
    pub fn fields_match(&self, node: &Node) -> bool {
        self.node_type == node.node_type
            && self.name == node.name
            && self.description == node.description
            && self.params == node.params
    }

    /// Overwrite type, name, description and params from `node`.
    ///
    /// `id` and `child_ids` are never touched.
    pub fn apply_fields(&mut self, node: &Node) {
        self.node_type = node.node_type;
        self.name = node.name.clone();
        self.description = node.description.clone();
        self.params = node.params.clone();
    }

    pub fn has_child(&self, id: &str) -> bool {
        self.child_ids.iter().any(|c| c == id)
    }

    /// Build the nested form from already resolved children.
    pub fn into_node(self, children: Vec<Node>) -> Node {
        Node {
            id: self.id,
            node_type: self.node_type,
            name: self.name,
            description: self.description,
            params: self.params,
            children,
        }
    }
}

/// Result of removing a single store entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the entry existed before deletion
    ///
    /// - `true`: Entry existed and was deleted
    /// - `false`: Entry didn't exist (idempotent no-op)
    pub existed: bool,
}

impl DeleteResult {
    pub fn existed() -> Self {
        Self { existed: true }
    }

    pub fn not_found() -> Self {
        Self { existed: false }
    }
}
