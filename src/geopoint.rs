// src/geopoint.rs

use serde::{Deserialize, Serialize};

use crate::error::GeofenceError;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Represents a geographical point in degrees.
///
/// Every `GeoPoint` has been range-checked, including ones deserialized from JSON.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeofenceError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Creates a new `GeoPoint`.
    ///
    /// # Errors
    /// Returns `GeofenceError::InvalidCoordinate` if latitude is not between -90 and 90,
    /// or longitude is not between -180 and 180.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeofenceError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeofenceError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90 degrees, got {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeofenceError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180 degrees, got {}",
                longitude
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    // For constants already known to be in range.
    pub(crate) fn from_checked(latitude: f64, longitude: f64) -> Self {
        debug_assert!((-90.0..=90.0).contains(&latitude));
        debug_assert!((-180.0..=180.0).contains(&longitude));
        GeoPoint {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }
}

/// Great-circle distance between two points in meters, using the haversine formula.
///
/// The intermediate term is clamped to `[0, 1]` so rounding near zero or at the
/// antipode never feeds a negative value into `sqrt`.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
