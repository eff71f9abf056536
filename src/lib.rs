pub mod classifier;
pub mod client;
pub mod config;
pub mod error;
pub mod geojson;
pub mod geopoint;
pub mod perimeter;
pub mod render;
pub mod store;

pub use classifier::{classify, classify_with, ClassificationResult, ContainmentPolicy};
pub use client::PerimeterClient;
pub use config::GeofenceConfig;
pub use error::GeofenceError;
pub use geopoint::{haversine_distance, GeoPoint, EARTH_RADIUS_METERS};
pub use perimeter::{Perimeter, PerimeterSet, DEFAULT_RADIUS_METERS};
pub use render::{CircleOverlay, MapView, RenderInstruction};
pub use store::{PerimeterSnapshot, PerimeterStore};
