// src/render.rs

use serde::Serialize;
use std::sync::Arc;

use crate::classifier::{classify_with, ClassificationResult, ContainmentPolicy};
use crate::config::GeofenceConfig;
use crate::error::GeofenceError;
use crate::geopoint::GeoPoint;
use crate::store::PerimeterStore;

pub const OUTSIDE_MESSAGE: &str = "Outside all perimeters";

/// What the rendering surface should draw after a click.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RenderInstruction {
    /// Where to put the marker.
    pub marker: GeoPoint,
    pub inside: bool,
    /// Name of the containing perimeter. Only set when `inside`.
    pub nearest_name: Option<String>,
    pub nearest_perimeter_id: Option<i64>,
    pub message: String,
}

impl RenderInstruction {
    /// Popup text with the selected coordinates and the inside/outside message.
    pub fn popup_text(&self) -> String {
        format!(
            "Selected coordinates:\nLat: {:.6}\nLng: {:.6}\n{}",
            self.marker.latitude(), self.marker.longitude(), self.message
        )
    }
}

/// A perimeter drawn as a circle, for visual reference only.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CircleOverlay {
    pub id: i64,
    pub center: GeoPoint,
    pub radius: f64,
}

/// Headless state of the map widget.
///
/// Owns the selected point and the last classification. Every click replaces both;
/// the classifier itself stays a pure function of the point and the store snapshot.
#[derive(Debug)]
pub struct MapView {
    store: Arc<PerimeterStore>,
    policy: ContainmentPolicy,
    center: GeoPoint,
    zoom: u8,
    selected: Option<GeoPoint>,
    last_result: Option<ClassificationResult>,
}

impl MapView {
    pub fn new(store: Arc<PerimeterStore>) -> Self {
        Self::with_config(store, &GeofenceConfig::default())
    }

    pub fn with_config(store: Arc<PerimeterStore>, config: &GeofenceConfig) -> Self {
        MapView {
            store,
            policy: config.containment_policy,
            center: config.map_center,
            zoom: config.zoom,
            selected: None,
            last_result: None,
        }
    }

    pub fn with_policy(mut self, policy: ContainmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Handles a click at `point` and returns what to draw.
    pub fn select(&mut self, point: GeoPoint) -> RenderInstruction {
        let snapshot = self.store.snapshot();
        let perimeters = snapshot.perimeters.as_slice();
        let result = classify_with(&point, perimeters, self.policy);

        let nearest_name = if result.inside {
            result.nearest(perimeters).map(|p| p.display_name())
        } else {
            None
        };
        let message = match &nearest_name {
            Some(name) => format!("Inside the perimeter of {}", name),
            None => OUTSIDE_MESSAGE.to_string(),
        };

        self.selected = Some(point);
        self.last_result = Some(result);

        RenderInstruction {
            marker: point,
            inside: result.inside,
            nearest_name,
            nearest_perimeter_id: result.nearest_perimeter_id,
            message,
        }
    }

    /// Like [`MapView::select`], validating raw click coordinates first.
    pub fn select_lat_lng(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RenderInstruction, GeofenceError> {
        let point = GeoPoint::new(latitude, longitude)?;
        Ok(self.select(point))
    }

    /// One circle per perimeter in the current snapshot.
    pub fn overlays(&self) -> Vec<CircleOverlay> {
        self.store
            .snapshot()
            .perimeters
            .iter()
            .map(|p| CircleOverlay {
                id: p.id(),
                center: *p.center(),
                radius: p.radius(),
            })
            .collect()
    }

    pub fn selected(&self) -> Option<&GeoPoint> {
        self.selected.as_ref()
    }

    pub fn last_result(&self) -> Option<&ClassificationResult> {
        self.last_result.as_ref()
    }

    pub fn center(&self) -> &GeoPoint {
        &self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }
}
