//! Service Layer Error Types
//!
//! This module defines error types for tree operations. Conflicts are not errors:
//! they are reported through `CreateReport` so a partially applied create still
//! returns normally.

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Operation not allowed for the node's type (children under a terminal node,
    /// network delete of a non-network node)
    #[error("Structural misuse: {0}")]
    StructuralMisuse(String),

    /// Payload failed field validation
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl NodeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a structural misuse error
    pub fn structural_misuse(msg: impl Into<String>) -> Self {
        Self::StructuralMisuse(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }

    pub fn is_structural_misuse(&self) -> bool {
        matches!(self, Self::StructuralMisuse(_))
    }
}
