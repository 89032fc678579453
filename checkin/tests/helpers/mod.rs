//! Shared fakes and builders for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use checkin::CheckInService;
use checkin::error::{CheckInError, RemoteError};
use checkin::location::LocationProvider;
use checkin::remote::{AttendanceApi, InsertOutcome};
use checkin::store::MemoryQueueStore;
use checkin::types::{AttendanceSession, Coordinates, NewAttendanceRecord};

/// Campus anchor used throughout the scenarios.
pub const ANCHOR: Coordinates = Coordinates {
    latitude: -25.7545,
    longitude: 28.2314,
};

/// Roughly 50m north of [`ANCHOR`].
pub const NEAR_ANCHOR: Coordinates = Coordinates {
    latitude: -25.75405,
    longitude: 28.2314,
};

/// Roughly 150m north of [`ANCHOR`].
pub const FAR_FROM_ANCHOR: Coordinates = Coordinates {
    latitude: -25.75315,
    longitude: 28.2314,
};

pub fn open_session(id: i64, anchor: Coordinates, radius_m: f64) -> AttendanceSession {
    AttendanceSession {
        id,
        location_lat: anchor.latitude,
        location_lng: anchor.longitude,
        geofence_radius_m: radius_m,
        expires_at: Utc::now() + ChronoDuration::hours(1),
    }
}

pub fn expired_session(id: i64, anchor: Coordinates, radius_m: f64) -> AttendanceSession {
    AttendanceSession {
        expires_at: Utc::now() - ChronoDuration::hours(1),
        ..open_session(id, anchor, radius_m)
    }
}

/// Scripted stand-in for the backend attendance API.
///
/// Keeps the (session, student) unique constraint, counts every call, and can
/// simulate a dead transport or per-session transient insert failures.
#[derive(Default)]
pub struct FakeApi {
    sessions: Mutex<HashMap<String, AttendanceSession>>,
    records: Mutex<HashSet<(i64, i64)>>,
    failing_inserts: Mutex<HashSet<i64>>,
    transport_down: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    insert_delay: Mutex<Option<Duration>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve_session(&self, code: &str, session: AttendanceSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(code.to_string(), session);
    }

    /// Pre-seeds an accepted record, so the next insert conflicts.
    pub fn seed_record(&self, session_id: i64, student_id: i64) {
        self.records.lock().unwrap().insert((session_id, student_id));
    }

    pub fn set_transport_down(&self, down: bool) {
        self.transport_down.store(down, Ordering::SeqCst);
    }

    /// Makes inserts against the given session fail transiently.
    pub fn fail_inserts_for(&self, session_id: i64) {
        self.failing_inserts.lock().unwrap().insert(session_id);
    }

    pub fn recover_inserts_for(&self, session_id: i64) {
        self.failing_inserts.lock().unwrap().remove(&session_id);
    }

    /// Stretches every insert, to hold a sync pass in flight.
    pub fn set_insert_delay(&self, delay: Duration) {
        *self.insert_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn has_record(&self, session_id: i64, student_id: i64) -> bool {
        self.records.lock().unwrap().contains(&(session_id, student_id))
    }
}

#[async_trait]
impl AttendanceApi for FakeApi {
    async fn fetch_session_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AttendanceSession>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(RemoteError("connection refused".into()));
        }
        Ok(self.sessions.lock().unwrap().get(code).cloned())
    }

    async fn insert_attendance_record(
        &self,
        record: &NewAttendanceRecord,
    ) -> Result<InsertOutcome, RemoteError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(RemoteError("connection refused".into()));
        }

        let delay = *self.insert_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing_inserts
            .lock()
            .unwrap()
            .contains(&record.session_id)
        {
            return Err(RemoteError("backend temporarily unavailable".into()));
        }

        let fresh = self
            .records
            .lock()
            .unwrap()
            .insert((record.session_id, record.student_id));
        if fresh {
            Ok(InsertOutcome::Created)
        } else {
            Ok(InsertOutcome::AlreadyRecorded)
        }
    }
}

/// Location provider that always answers with the same fix.
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_fix(&self) -> Result<Coordinates, CheckInError> {
        Ok(self.0)
    }
}

/// Location provider that always fails, as a denied permission would.
pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn current_fix(&self) -> Result<Coordinates, CheckInError> {
        Err(CheckInError::LocationUnavailable(
            "permission denied".into(),
        ))
    }
}

pub const STUDENT_ID: i64 = 42;

pub async fn service_with(
    api: Arc<FakeApi>,
    fix: Coordinates,
    initially_online: bool,
) -> CheckInService {
    CheckInService::new(
        Arc::new(MemoryQueueStore::new()),
        Arc::new(FixedLocation(fix)),
        api,
        STUDENT_ID,
        Duration::from_secs(10),
        initially_online,
    )
    .await
}
