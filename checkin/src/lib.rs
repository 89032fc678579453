//! # Offline-Capable Attendance Check-In
//!
//! Client-side engine that records geofenced, code-based attendance check-ins
//! and keeps working without a network: attempts made offline land in a
//! durable local queue and are reconciled against the backend once
//! connectivity returns.
//!
//! ## Key Concepts
//! - **CheckInService**: the facade a front end talks to: check in, inspect
//!   the pending queue, trigger or observe sync.
//! - **OfflineQueue**: persisted pending attempts; survives process restart.
//! - **ConnectivityMonitor**: online/offline state with edge-deduplicated
//!   transition events; reconnecting triggers an automatic sync.
//! - **SyncReconciler**: drains the queue item by item, treating a
//!   duplicate-record conflict as success and leaving transient failures
//!   queued for the next pass.
//!
//! Platform concerns (position source, queue storage medium, remote
//! transport) are ports: [`location::LocationProvider`],
//! [`store::QueueStore`] and [`remote::AttendanceApi`].

pub mod connectivity;
pub mod error;
pub mod location;
pub mod orchestrator;
pub mod queue;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use crate::connectivity::ConnectivityMonitor;
use crate::error::CheckInError;
use crate::location::{LocationProvider, LocationResolver};
use crate::orchestrator::CheckInOrchestrator;
use crate::queue::OfflineQueue;
use crate::remote::AttendanceApi;
use crate::store::QueueStore;
use crate::sync::SyncReconciler;
use crate::types::{CheckInOutcome, Coordinates, SyncReport};

/// The assembled check-in client.
///
/// Construction wires the queue, connectivity monitor, location resolver and
/// remote API together; everything a UI needs afterwards hangs off this one
/// handle. Cloning is cheap and all clones share state.
#[derive(Clone)]
pub struct CheckInService {
    queue: Arc<OfflineQueue>,
    monitor: ConnectivityMonitor,
    orchestrator: Arc<CheckInOrchestrator>,
    reconciler: Arc<SyncReconciler>,
}

impl CheckInService {
    pub async fn new(
        store: Arc<dyn QueueStore>,
        provider: Arc<dyn LocationProvider>,
        api: Arc<dyn AttendanceApi>,
        student_id: i64,
        location_timeout: Duration,
        initially_online: bool,
    ) -> Self {
        let queue = Arc::new(OfflineQueue::open(store).await);
        let monitor = ConnectivityMonitor::new(initially_online);
        let resolver = LocationResolver::new(provider, location_timeout);
        let orchestrator = Arc::new(CheckInOrchestrator::new(
            resolver,
            monitor.clone(),
            queue.clone(),
            api.clone(),
            student_id,
        ));
        let reconciler = Arc::new(SyncReconciler::new(queue.clone(), api, student_id));

        Self {
            queue,
            monitor,
            orchestrator,
            reconciler,
        }
    }

    /// One check-in attempt for a scanned or typed session code.
    pub async fn check_in(&self, code: &str) -> Result<CheckInOutcome, CheckInError> {
        self.orchestrator.check_in(code).await
    }

    /// Directly enqueues a pending attempt, bypassing the online path.
    pub async fn add_to_queue(&self, session_code: &str, fix: Coordinates) -> Uuid {
        self.queue.enqueue(session_code, fix).await
    }

    /// Number of unsynced queued attempts (for UI badges).
    pub async fn pending_count(&self) -> usize {
        self.queue.count().await
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Feeds the platform connectivity signal in; an offline→online edge with
    /// a non-empty queue is picked up by the auto-sync task, if spawned.
    pub fn set_online(&self, online: bool) -> bool {
        self.monitor.set_online(online)
    }

    pub fn is_syncing(&self) -> bool {
        self.reconciler.is_syncing()
    }

    /// Drains the offline queue once; see [`SyncReconciler::sync_queue`].
    pub async fn sync_queue(&self) -> SyncReport {
        self.reconciler.sync_queue().await
    }

    /// Transition events for UI notifications (one per actual edge).
    pub fn subscribe_connectivity(&self) -> watch::Receiver<bool> {
        self.monitor.subscribe()
    }

    /// Spawns the background task that syncs automatically when connectivity
    /// comes back and there is something to deliver. Overlapping triggers
    /// (automatic plus manual) collapse into one pass via the reconciler's
    /// in-flight guard.
    pub fn spawn_auto_sync(&self) -> tokio::task::JoinHandle<()> {
        let mut rx = self.monitor.subscribe();
        let queue = self.queue.clone();
        let reconciler = self.reconciler.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if online && queue.count().await > 0 {
                    let report = reconciler.sync_queue().await;
                    if !report.is_empty() {
                        tracing::info!(
                            "auto-sync: {} delivered, {} undeliverable",
                            report.success_count,
                            report.fail_count
                        );
                    }
                }
            }
        })
    }
}
