use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A device-reported coordinate pair, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A pending attendance attempt awaiting submission.
///
/// Created when the device is offline at check-in time, kept in the persisted
/// queue until a sync pass delivers it (or determines it is undeliverable).
/// `captured_at` records when the attempt was made, not when it is synced;
/// session expiry is always judged against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedCheckIn {
    pub id: Uuid,
    pub session_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
    pub synced: bool,
}

impl QueuedCheckIn {
    pub fn new(session_code: impl Into<String>, fix: Coordinates) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_code: session_code.into(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            captured_at: Utc::now(),
            synced: false,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// An attendance session as served by the backend. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub location_lat: f64,
    pub location_lng: f64,
    pub geofence_radius_m: f64,
    pub expires_at: DateTime<Utc>,
}

impl AttendanceSession {
    pub fn anchor(&self) -> Coordinates {
        Coordinates::new(self.location_lat, self.location_lng)
    }

    pub fn expired_at(&self, instant: DateTime<Utc>) -> bool {
        instant > self.expires_at
    }
}

/// Payload for the remote attendance record insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewAttendanceRecord {
    pub session_id: i64,
    pub student_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
}

impl NewAttendanceRecord {
    /// A "present" record, the only status this client ever submits.
    pub fn present(session_id: i64, student_id: i64, fix: Coordinates) -> Self {
        Self {
            session_id,
            student_id,
            latitude: fix.latitude,
            longitude: fix.longitude,
            status: "present".to_string(),
        }
    }
}

/// Terminal outcome of a check-in attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    /// The record was accepted remotely. `already_checked_in` distinguishes a
    /// fresh insert from a unique-conflict response (both count as success).
    Success { already_checked_in: bool },
    /// The device was offline; the attempt is persisted for later sync.
    Queued { id: Uuid },
}

/// Aggregate result of one sync pass over the offline queue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SyncReport {
    pub success_count: usize,
    pub fail_count: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.success_count == 0 && self.fail_count == 0
    }
}
