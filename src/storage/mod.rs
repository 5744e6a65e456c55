//! Whole-collection snapshot persistence.
//!
//! Repositories keep their collection in memory and hand the full snapshot to
//! a [`SnapshotStore`] after every mutation.

mod file;
mod memory;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt snapshot at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence port for one collection snapshot
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Load the last saved snapshot, `None` if nothing was saved yet
    async fn load(&self) -> Result<Option<T>, StorageError>;

    /// Replace the stored snapshot with `snapshot`
    async fn save(&self, snapshot: &T) -> Result<(), StorageError>;
}
