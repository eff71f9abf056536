// src/perimeter.rs

use serde::Serialize;

use crate::error::GeofenceError;
use crate::geopoint::GeoPoint;

/// Radius applied to perimeter records that do not carry one, in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 50.0;

/// A named circular region on the map.
///
/// Perimeters are immutable once built; a reload replaces the whole collection.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Perimeter {
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    center: GeoPoint,
    radius: f64,
}

impl Perimeter {
    /// Creates a new `Perimeter`.
    ///
    /// # Arguments
    /// * `id` - Identifier, unique within a `PerimeterSet`.
    /// * `name` - Optional human-readable name.
    /// * `center` - Center of the circle.
    /// * `radius` - Radius in meters. Must be positive and finite.
    pub fn new(
        id: i64,
        name: Option<impl Into<String>>,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Self, GeofenceError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeofenceError::InvalidRadius { id, radius });
        }
        Ok(Perimeter {
            id,
            name: name.map(Into::into),
            center,
            radius,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn center(&self) -> &GeoPoint {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Name to show in the UI, falling back to the id for unnamed perimeters.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("perimeter #{}", self.id),
        }
    }
}

/// An ordered collection of perimeters with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerimeterSet {
    perimeters: Vec<Perimeter>,
}

impl PerimeterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set, failing on the first duplicated id.
    pub fn from_perimeters(
        perimeters: impl IntoIterator<Item = Perimeter>,
    ) -> Result<Self, GeofenceError> {
        let mut set = PerimeterSet::new();
        for perimeter in perimeters {
            set.push(perimeter)?;
        }
        Ok(set)
    }

    /// Appends a perimeter, keeping scan order.
    pub fn push(&mut self, perimeter: Perimeter) -> Result<(), GeofenceError> {
        if self.get(perimeter.id).is_some() {
            return Err(GeofenceError::DuplicatePerimeterId(perimeter.id));
        }
        self.perimeters.push(perimeter);
        Ok(())
    }

    pub fn get(&self, id: i64) -> Option<&Perimeter> {
        self.perimeters.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Perimeter> {
        self.perimeters.iter()
    }

    pub fn as_slice(&self) -> &[Perimeter] {
        &self.perimeters
    }

    pub fn len(&self) -> usize {
        self.perimeters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty()
    }
}

impl<'a> IntoIterator for &'a PerimeterSet {
    type Item = &'a Perimeter;
    type IntoIter = std::slice::Iter<'a, Perimeter>;

    fn into_iter(self) -> Self::IntoIter {
        self.perimeters.iter()
    }
}
