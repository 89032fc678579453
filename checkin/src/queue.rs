//! Local durable queue of pending check-in attempts.
//!
//! Every mutation is written through to the backing store before the call
//! returns. Loss or corruption of the persisted store degrades to an empty
//! queue rather than an error: a forgotten queue is recoverable, a crashed
//! client is not.

use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::QueueStore;
use crate::types::{Coordinates, QueuedCheckIn};

pub struct OfflineQueue {
    store: Arc<dyn QueueStore>,
    entries: Mutex<Vec<QueuedCheckIn>>,
}

impl OfflineQueue {
    /// Opens the queue, loading whatever the store has persisted.
    pub async fn open(store: Arc<dyn QueueStore>) -> Self {
        let entries = match store.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not load persisted queue, starting empty: {e}");
                Vec::new()
            }
        };
        if !entries.is_empty() {
            tracing::info!("loaded {} pending check-in(s) from storage", entries.len());
        }
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    /// Persists a new pending attempt and returns its generated id.
    ///
    /// Never fails from the caller's point of view: if the write-through does
    /// not stick, the entry still lives in memory and the error is logged.
    pub async fn enqueue(&self, session_code: &str, fix: Coordinates) -> Uuid {
        let attempt = QueuedCheckIn::new(session_code, fix);
        let id = attempt.id;

        let mut entries = self.entries.lock().await;
        entries.push(attempt);
        self.persist(&entries).await;
        tracing::info!("queued offline check-in {id} for code {session_code}");
        id
    }

    /// All unsynced entries, in insertion order.
    pub async fn list(&self) -> Vec<QueuedCheckIn> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| !e.synced)
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.entries.lock().await.iter().filter(|e| !e.synced).count()
    }

    /// Flips the synced flag and deletes the entry in one write-through.
    ///
    /// The flag is only ever observed set on an entry that is about to be
    /// removed; it exists so a crash between the two steps leaves a marker
    /// rather than a duplicate-looking pending attempt.
    pub async fn mark_synced_and_remove(&self, id: Uuid) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.iter_mut().find(|e| e.id == id) {
            entry.synced = true;
        }
        entries.retain(|e| e.id != id);
        self.persist(&entries).await;
    }

    /// Deletes an entry without touching the synced flag.
    pub async fn remove(&self, id: Uuid) {
        let mut entries = self.entries.lock().await;
        entries.retain(|e| e.id != id);
        self.persist(&entries).await;
    }

    async fn persist(&self, entries: &[QueuedCheckIn]) {
        if let Err(e) = self.store.save(entries).await {
            tracing::error!("failed to persist offline queue: {e}");
        }
    }
}
