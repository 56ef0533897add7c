//! NetGraph Core
//!
//! Tree management engine for network inventories. A network is a tree of typed
//! nodes whose types follow the cycle NETWORK -> NODE -> RESOURCE -> NETWORK: every
//! child has the successor type of its parent.
//!
//! # Modules
//!
//! - [`models`] - `Node`, `NodeType` and the flat `NodeRecord` the stores persist
//! - [`db`] - `NodeStore` contract with in-memory and JSON file implementations
//! - [`services`] - `NodeService` tree mutations and `HierarchyValidator`
//! - [`api`] - axum HTTP adapter
//! - [`config`] - Runtime configuration

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::NetGraphConfig;
pub use db::{JsonFileStore, MemoryStore, NodeStore, StoreError};
pub use models::*;
pub use services::*;
