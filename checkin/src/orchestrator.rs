//! The check-in flow: acquire a fix, then submit or queue.
//!
//! Both entry paths (QR scan and manual code entry) converge here. An online
//! device validates against the fetched session and submits immediately; an
//! offline device enqueues without any remote validation, so the user is
//! never blocked from marking attendance by a dead connection. Validation of
//! queued attempts happens at sync time.

use chrono::Utc;
use std::sync::Arc;

use crate::connectivity::ConnectivityMonitor;
use crate::error::CheckInError;
use crate::location::{LocationResolver, check_geofence};
use crate::queue::OfflineQueue;
use crate::remote::{AttendanceApi, InsertOutcome};
use crate::types::{CheckInOutcome, NewAttendanceRecord};

pub struct CheckInOrchestrator {
    resolver: LocationResolver,
    monitor: ConnectivityMonitor,
    queue: Arc<OfflineQueue>,
    api: Arc<dyn AttendanceApi>,
    student_id: i64,
}

impl CheckInOrchestrator {
    pub fn new(
        resolver: LocationResolver,
        monitor: ConnectivityMonitor,
        queue: Arc<OfflineQueue>,
        api: Arc<dyn AttendanceApi>,
        student_id: i64,
    ) -> Self {
        Self {
            resolver,
            monitor,
            queue,
            api,
            student_id,
        }
    }

    /// Runs one check-in attempt for a scanned or typed session code.
    ///
    /// A failed location fix is terminal for the attempt; the fix is not
    /// retried here. Online submission failures are returned as
    /// [`CheckInError::SubmissionFailed`] and are NOT queued; only attempts
    /// made while the device reports offline go through the queue.
    pub async fn check_in(&self, code: &str) -> Result<CheckInOutcome, CheckInError> {
        let code = code.trim();
        tracing::debug!("check-in attempt for code {code}");

        let fix = self.resolver.acquire().await?;

        if !self.monitor.is_online() {
            let id = self.queue.enqueue(code, fix).await;
            return Ok(CheckInOutcome::Queued { id });
        }

        let session = self
            .api
            .fetch_session_by_code(code)
            .await
            .map_err(|e| CheckInError::SubmissionFailed(e.0))?
            .ok_or(CheckInError::InvalidCode)?;

        if session.expired_at(Utc::now()) {
            return Err(CheckInError::SessionExpired);
        }
        check_geofence(fix, &session)?;

        let record = NewAttendanceRecord::present(session.id, self.student_id, fix);
        match self.api.insert_attendance_record(&record).await {
            Ok(InsertOutcome::Created) => {
                tracing::info!("attendance recorded for session {}", session.id);
                Ok(CheckInOutcome::Success {
                    already_checked_in: false,
                })
            }
            Ok(InsertOutcome::AlreadyRecorded) => Ok(CheckInOutcome::Success {
                already_checked_in: true,
            }),
            Err(e) => Err(CheckInError::SubmissionFailed(e.0)),
        }
    }
}
