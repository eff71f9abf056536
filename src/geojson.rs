// src/geojson.rs

use serde::Deserialize;
use serde_json::Value;

use crate::error::GeofenceError;
use crate::geopoint::GeoPoint;
use crate::perimeter::{Perimeter, PerimeterSet, DEFAULT_RADIUS_METERS};

/// The body returned by the locations endpoint.
///
/// Properties and geometry are kept loosely typed here; `into_perimeters` is the only
/// place where they are turned into validated `Perimeter`s.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub type_field: Option<String>,
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct FeatureProperties {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub radius_perimeter: Option<Value>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub type_field: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<Value>,
}

impl FeatureCollection {
    /// Parses a response body, failing only when it is not a feature collection at all.
    pub fn from_slice(body: &[u8]) -> Result<Self, GeofenceError> {
        serde_json::from_slice(body).map_err(|e| {
            GeofenceError::JsonDeserializationFailed(format!(
                "Expected a GeoJSON FeatureCollection: {}. Body: {}",
                e,
                String::from_utf8_lossy(body).chars().take(200).collect::<String>()
            ))
        })
    }

    /// Validates every feature and keeps the ones that describe a usable perimeter.
    ///
    /// Malformed features are logged and skipped. A feature whose id was already seen is
    /// skipped as well, so the first occurrence wins.
    pub fn into_perimeters(self) -> PerimeterSet {
        let total = self.features.len();
        let mut set = PerimeterSet::new();

        for (index, feature) in self.features.into_iter().enumerate() {
            let perimeter = match feature.into_perimeter(index) {
                Ok(perimeter) => perimeter,
                Err(e) => {
                    log::warn!("Skipping feature #{}: {}", index, e);
                    continue;
                }
            };
            if let Err(e) = set.push(perimeter) {
                log::warn!("Skipping feature #{}: {}", index, e);
            }
        }

        log::debug!("Accepted {} of {} perimeter features", set.len(), total);
        set
    }
}

impl Feature {
    /// Converts one feature into a `Perimeter`, `index` being its position in the collection.
    pub fn into_perimeter(self, index: usize) -> Result<Perimeter, GeofenceError> {
        let properties = self.properties.unwrap_or_default();
        let id = match properties.id.as_ref().map(perimeter_id).transpose()?.flatten() {
            Some(id) if id != 0 => id,
            _ => index as i64 + 1,
        };

        let radius = match properties.radius_perimeter.as_ref() {
            None | Some(Value::Null) => DEFAULT_RADIUS_METERS,
            Some(value) => match value.as_f64() {
                Some(r) if r == 0.0 => DEFAULT_RADIUS_METERS,
                Some(r) => r,
                None => {
                    return Err(GeofenceError::InvalidRadius {
                        id,
                        radius: f64::NAN,
                    })
                }
            },
        };

        let geometry = self.geometry.ok_or_else(|| {
            GeofenceError::InvalidCoordinate(format!("Feature {} has no geometry", id))
        })?;
        let center = geometry.center(id)?;

        Perimeter::new(id, properties.name, center, radius)
    }
}

// Null means "absent". Integral floats such as `2.0` keep their value; anything else is
// rejected rather than renumbered, since a made-up id could shadow a real one.
fn perimeter_id(value: &Value) -> Result<Option<i64>, GeofenceError> {
    if value.is_null() {
        return Ok(None);
    }
    if let Some(id) = value.as_i64() {
        return Ok(Some(id));
    }
    match value.as_f64() {
        Some(id) if id.fract() == 0.0 && id >= i64::MIN as f64 && id < i64::MAX as f64 => {
            Ok(Some(id as i64))
        }
        _ => Err(GeofenceError::InvalidPerimeterId(format!(
            "expected an integer, got {}",
            value
        ))),
    }
}

impl Geometry {
    // GeoJSON positions are [longitude, latitude].
    fn center(&self, id: i64) -> Result<GeoPoint, GeofenceError> {
        match self.coordinates.as_slice() {
            [lng, lat, ..] => match (lng.as_f64(), lat.as_f64()) {
                (Some(lng), Some(lat)) => GeoPoint::new(lat, lng),
                _ => Err(GeofenceError::InvalidCoordinate(format!(
                    "Feature {} has non-numeric coordinates",
                    id
                ))),
            },
            _ => Err(GeofenceError::InvalidCoordinate(format!(
                "Feature {} needs a [longitude, latitude] position",
                id
            ))),
        }
    }
}
