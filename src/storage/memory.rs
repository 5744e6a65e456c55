use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{SnapshotStore, StorageError};

/// In-memory snapshot store, used by tests in place of a file
#[derive(Debug)]
pub struct MemoryStore<T> {
    snapshot: Mutex<Option<T>>,
    saves: AtomicUsize,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    /// Start with an already persisted snapshot
    pub fn with_snapshot(snapshot: T) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The last saved snapshot
    pub fn snapshot(&self) -> Option<T> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<T>, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, snapshot: &T) -> Result<(), StorageError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
