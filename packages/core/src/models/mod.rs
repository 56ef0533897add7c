//! Data Models
//!
//! - `NodeType` - Cyclic hierarchy levels (NETWORK, NODE, RESOURCE)
//! - `Node` - Nested node payload, the shape callers send and receive
//! - `NodeRecord` - Flat persisted form with children stored as ids

mod node;


pub use node::{DeleteResult, Node, NodeRecord, NodeType, ValidationError};
