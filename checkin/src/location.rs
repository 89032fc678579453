//! Location acquisition and proximity checks.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CheckInError;
use crate::types::{AttendanceSession, Coordinates};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One-shot, high-accuracy device position source.
///
/// Implementations should block (asynchronously) until a fix is available or
/// the platform reports denial; the resolver applies the overall timeout.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_fix(&self) -> Result<Coordinates, CheckInError>;
}

/// Wraps a [`LocationProvider`] with the bounded acquisition timeout.
pub struct LocationResolver {
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn LocationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Requests one fix, failing fast rather than hanging: a provider that
    /// does not answer within the timeout yields `LocationUnavailable`.
    pub async fn acquire(&self) -> Result<Coordinates, CheckInError> {
        match tokio::time::timeout(self.timeout, self.provider.current_fix()).await {
            Ok(result) => result,
            Err(_) => Err(CheckInError::LocationUnavailable(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// Great-circle distance between two coordinate pairs, in meters (haversine).
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Passes iff the fix is within the session's allowed radius; the violation
/// carries both measured and allowed distance for the user-facing message.
pub fn check_geofence(fix: Coordinates, session: &AttendanceSession) -> Result<(), CheckInError> {
    let distance_m = distance_meters(fix, session.anchor());
    if distance_m <= session.geofence_radius_m {
        Ok(())
    } else {
        Err(CheckInError::GeofenceViolation {
            distance_m,
            allowed_m: session.geofence_radius_m,
        })
    }
}
