//! Persistence port for the offline queue.
//!
//! The queue is stored as one JSON array in one well-known location, read at
//! startup and rewritten on every mutation. The port is a trait so tests (and
//! non-file targets) can swap the medium.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::types::QueuedCheckIn;

#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn load(&self) -> Result<Vec<QueuedCheckIn>, StoreError>;
    async fn save(&self, entries: &[QueuedCheckIn]) -> Result<(), StoreError>;
}

/// File-backed store: the whole queue serialized as a single JSON array.
pub struct FileQueueStore {
    path: PathBuf,
}

impl FileQueueStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl QueueStore for FileQueueStore {
    async fn load(&self) -> Result<Vec<QueuedCheckIn>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, entries: &[QueuedCheckIn]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string(entries)?;
        // Awaited to completion so a crash right after enqueue cannot lose the entry.
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryQueueStore {
    entries: Mutex<Vec<QueuedCheckIn>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn load(&self) -> Result<Vec<QueuedCheckIn>, StoreError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn save(&self, entries: &[QueuedCheckIn]) -> Result<(), StoreError> {
        *self.entries.lock().unwrap() = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;

    #[tokio::test]
    async fn file_store_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        let store = FileQueueStore::new(&path);

        let entries = vec![
            QueuedCheckIn::new("ABC123", Coordinates::new(-25.7545, 28.2314)),
            QueuedCheckIn::new("XYZ789", Coordinates::new(-25.7550, 28.2300)),
        ];
        store.save(&entries).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, entries);
    }

    #[tokio::test]
    async fn file_store_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileQueueStore::new(dir.path().join("nonexistent.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileQueueStore::new(dir.path().join("nested/deeper/queue.json"));
        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_corrupt_payload_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        std::fs::write(&path, "{ not json ]").unwrap();

        let store = FileQueueStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(crate::error::StoreError::Corrupt(_))
        ));
    }
}
