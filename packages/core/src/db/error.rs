//! Store Error Types
//!
//! Errors raised by `NodeStore` implementations. The engine treats them as opaque
//! I/O faults and propagates them unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Node store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored data could not be encoded or decoded
    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock
    #[error("Store lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl StoreError {
    /// Create an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a lock poisoned error
    pub fn lock_poisoned(context: impl Into<String>) -> Self {
        Self::LockPoisoned {
            context: context.into(),
        }
    }
}
