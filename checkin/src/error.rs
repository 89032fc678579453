//! Error types for the check-in client.
//!
//! Validation failures (unknown code, expiry, geofence) are resolved against
//! fetched session state and returned as typed variants so the caller can
//! build a precise user-facing message; they are never surfaced as opaque
//! transport errors. Transport failures keep the underlying message for
//! diagnostics.

use thiserror::Error;

/// All failure modes of a check-in attempt.
#[derive(Debug, Error)]
pub enum CheckInError {
    /// Location fix denied, timed out, or unsupported on this device.
    /// Never retried automatically; the caller must re-invoke.
    #[error("could not acquire a location fix: {0}")]
    LocationUnavailable(String),

    /// The session code does not resolve to any attendance session.
    #[error("no attendance session matches this code")]
    InvalidCode,

    /// The session had already expired at the time of the attempt.
    #[error("this attendance session has expired")]
    SessionExpired,

    /// Outside the session's allowed radius. Carries the measured distance
    /// and the allowed radius for display.
    #[error("out of range: {distance_m:.0}m from the session location, allowed {allowed_m:.0}m")]
    GeofenceViolation { distance_m: f64, allowed_m: f64 },

    /// Transient remote failure on the online path. Not auto-queued: only
    /// attempts made while the device is known offline are enqueued.
    #[error("attendance submission failed: {0}")]
    SubmissionFailed(String),
}

/// Transport-level failure of a remote attendance call.
#[derive(Debug, Error)]
#[error("remote call failed: {0}")]
pub struct RemoteError(pub String);

/// Failure reading or writing the persisted queue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("queue storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue storage contains invalid data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
