use crate::classifier::ContainmentPolicy;
use crate::error::GeofenceError;
use crate::geopoint::GeoPoint;
use std::time::Duration;

pub const DEFAULT_LOCATIONS_URL: &str = "http://localhost:8080/api/locations";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ZOOM: u8 = 16;
pub const DEFAULT_MAP_LATITUDE: f64 = -2.168931;
pub const DEFAULT_MAP_LONGITUDE: f64 = -79.897686;

const ENV_LOCATIONS_URL: &str = "GEOFENCE_LOCATIONS_URL";
const ENV_TIMEOUT_SECS: &str = "GEOFENCE_TIMEOUT_SECS";
const ENV_CONTAINMENT_POLICY: &str = "GEOFENCE_CONTAINMENT_POLICY";

/// Settings shared by the perimeter client and the map view.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceConfig {
    /// Endpoint returning the perimeter FeatureCollection.
    pub locations_url: String,
    /// Timeout applied to each request to `locations_url`.
    pub timeout: Duration,
    /// Where the map is initially centered.
    pub map_center: GeoPoint,
    pub zoom: u8,
    pub containment_policy: ContainmentPolicy,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        GeofenceConfig {
            locations_url: DEFAULT_LOCATIONS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            map_center: GeoPoint::from_checked(DEFAULT_MAP_LATITUDE, DEFAULT_MAP_LONGITUDE),
            zoom: DEFAULT_ZOOM,
            containment_policy: ContainmentPolicy::default(),
        }
    }
}

impl GeofenceConfig {
    /// Builds a configuration from the process environment, falling back to defaults
    /// for every variable that is not set.
    ///
    /// # Environment
    /// * `GEOFENCE_LOCATIONS_URL`: the locations endpoint.
    /// * `GEOFENCE_TIMEOUT_SECS`: request timeout in whole seconds.
    /// * `GEOFENCE_CONTAINMENT_POLICY`: `closest` or `last-match`.
    pub fn from_env() -> Result<Self, GeofenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Separated from `from_env` so parsing can be tested without touching the environment.
    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GeofenceError> {
        let mut config = GeofenceConfig::default();

        if let Some(url) = lookup(ENV_LOCATIONS_URL) {
            if url.trim().is_empty() {
                return Err(GeofenceError::InvalidConfig(format!(
                    "{} is set but empty",
                    ENV_LOCATIONS_URL
                )));
            }
            config.locations_url = url.trim().to_string();
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                GeofenceError::InvalidConfig(format!(
                    "{} must be a whole number of seconds, got '{}': {}",
                    ENV_TIMEOUT_SECS, secs, e
                ))
            })?;
            if secs == 0 {
                return Err(GeofenceError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    ENV_TIMEOUT_SECS
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(policy) = lookup(ENV_CONTAINMENT_POLICY) {
            config.containment_policy = policy.parse()?;
        }

        log::debug!("Loaded geofence configuration: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = GeofenceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, GeofenceConfig::default());
        assert_eq!(config.locations_url, DEFAULT_LOCATIONS_URL);
        assert_eq!(config.zoom, 16);
        assert_eq!(
            Some(config.map_center),
            GeoPoint::new(DEFAULT_MAP_LATITUDE, DEFAULT_MAP_LONGITUDE).ok()
        );
    }

    #[test]
    fn reads_overrides() {
        let config = GeofenceConfig::from_lookup(lookup_from(&[
            ("GEOFENCE_LOCATIONS_URL", " https://geo.example.com/api/locations "),
            ("GEOFENCE_TIMEOUT_SECS", "3"),
            ("GEOFENCE_CONTAINMENT_POLICY", "last-match"),
        ]))
        .unwrap();
        assert_eq!(config.locations_url, "https://geo.example.com/api/locations");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.containment_policy, ContainmentPolicy::LastMatch);
    }

    #[test]
    fn rejects_bad_values() {
        for pairs in [
            [("GEOFENCE_TIMEOUT_SECS", "soon")],
            [("GEOFENCE_TIMEOUT_SECS", "0")],
            [("GEOFENCE_LOCATIONS_URL", "  ")],
            [("GEOFENCE_CONTAINMENT_POLICY", "random")],
        ] {
            let result = GeofenceConfig::from_lookup(lookup_from(&pairs));
            assert!(
                matches!(result, Err(GeofenceError::InvalidConfig(_))),
                "{:?} should be rejected",
                pairs
            );
        }
    }
}
