//! Business Services
//!
//! This module contains the tree management engine:
//!
//! - `NodeService` - Create, read, update, add-children and delete over whole subtrees
//! - `HierarchyValidator` - Read-only uniqueness and type-ordering checks
//!
//! Both talk to storage only through the `NodeStore` trait.

pub mod error;
pub mod hierarchy_validator;
pub mod node_service;


pub use error::NodeServiceError;
pub use hierarchy_validator::{HierarchyValidator, ValidationReport, Violation};
pub use node_service::{CreateReport, DeleteReport, NodeService, UpdateReport};
