use async_trait::async_trait;
use std::env;

use checkin::error::CheckInError;
use checkin::location::LocationProvider;
use checkin::types::Coordinates;

/// Position source for a terminal, which has no GPS: the operator supplies
/// the fix through `LOCATION_LAT` / `LOCATION_LNG`. Missing or unparsable
/// values behave like a denied platform permission.
pub struct EnvLocationProvider;

#[async_trait]
impl LocationProvider for EnvLocationProvider {
    async fn current_fix(&self) -> Result<Coordinates, CheckInError> {
        let lat = read_coordinate("LOCATION_LAT")?;
        let lng = read_coordinate("LOCATION_LNG")?;
        Ok(Coordinates::new(lat, lng))
    }
}

fn read_coordinate(var: &str) -> Result<f64, CheckInError> {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CheckInError::LocationUnavailable(format!("{var} is not set to a number")))
}
