//! Reconciliation of the offline queue against the remote store.
//!
//! A sync pass walks the queue in enqueue order and settles every item it
//! can: delivered and permanently-undeliverable items leave the queue, items
//! that fail transiently stay for the next pass. One bad item never aborts
//! the pass for the rest.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::queue::OfflineQueue;
use crate::remote::AttendanceApi;
use crate::types::{NewAttendanceRecord, QueuedCheckIn, SyncReport};

enum Disposition {
    /// Accepted remotely (fresh insert or already recorded).
    Delivered,
    /// Will never be deliverable; dropped from the queue.
    Undeliverable(&'static str),
    /// Transient failure; left in the queue for the next pass.
    Retry(String),
}

pub struct SyncReconciler {
    queue: Arc<OfflineQueue>,
    api: Arc<dyn AttendanceApi>,
    student_id: i64,
    syncing: AtomicBool,
}

impl SyncReconciler {
    pub fn new(queue: Arc<OfflineQueue>, api: Arc<dyn AttendanceApi>, student_id: i64) -> Self {
        Self {
            queue,
            api,
            student_id,
            syncing: AtomicBool::new(false),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Drains the queue once. Re-entrant-safe: a call that arrives while a
    /// pass is in flight is dropped (returns an empty report) so two drains
    /// can never double-submit the same items.
    pub async fn sync_queue(&self) -> SyncReport {
        if self.syncing.swap(true, Ordering::SeqCst) {
            tracing::debug!("sync already in flight, request dropped");
            return SyncReport::default();
        }

        let report = self.drain().await;

        self.syncing.store(false, Ordering::SeqCst);
        report
    }

    async fn drain(&self) -> SyncReport {
        let items = self.queue.list().await;
        let mut report = SyncReport::default();
        if items.is_empty() {
            return report;
        }

        tracing::info!("sync pass starting: {} pending check-in(s)", items.len());
        for item in &items {
            match self.reconcile(item).await {
                Disposition::Delivered => {
                    self.queue.mark_synced_and_remove(item.id).await;
                    report.success_count += 1;
                }
                Disposition::Undeliverable(reason) => {
                    tracing::warn!("dropping queued check-in {}: {reason}", item.id);
                    self.queue.mark_synced_and_remove(item.id).await;
                    report.fail_count += 1;
                }
                Disposition::Retry(err) => {
                    tracing::warn!("queued check-in {} will be retried: {err}", item.id);
                }
            }
        }
        tracing::info!(
            "sync pass finished: {} delivered, {} undeliverable",
            report.success_count,
            report.fail_count
        );
        report
    }

    async fn reconcile(&self, item: &QueuedCheckIn) -> Disposition {
        let session = match self.api.fetch_session_by_code(&item.session_code).await {
            Ok(Some(session)) => session,
            Ok(None) => return Disposition::Undeliverable("session no longer exists"),
            Err(e) => return Disposition::Retry(e.0),
        };

        // Expiry is judged against the moment the attempt was captured, not
        // against sync time: a check-in made in time stays valid however long
        // the device was offline afterwards.
        if session.expired_at(item.captured_at) {
            return Disposition::Undeliverable("session expired before the attempt was captured");
        }

        // The fix captured at attempt time is trusted as-is; no geofence
        // re-check happens here.
        let record = NewAttendanceRecord::present(session.id, self.student_id, item.coordinates());
        match self.api.insert_attendance_record(&record).await {
            Ok(_) => Disposition::Delivered,
            Err(e) => Disposition::Retry(e.0),
        }
    }
}
