// src/classifier.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GeofenceError;
use crate::geopoint::GeoPoint;
use crate::perimeter::Perimeter;

/// Decides which perimeter is reported when a point lies inside more than one.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentPolicy {
    /// The containing perimeter with the nearest center wins. Ties go to the first one scanned.
    #[default]
    ClosestContaining,
    /// The last containing perimeter in scan order wins.
    LastMatch,
}

impl FromStr for ContainmentPolicy {
    type Err = GeofenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closest" | "closest-containing" => Ok(ContainmentPolicy::ClosestContaining),
            "last" | "last-match" => Ok(ContainmentPolicy::LastMatch),
            other => Err(GeofenceError::InvalidConfig(format!(
                "Unknown containment policy '{}', expected 'closest' or 'last-match'",
                other
            ))),
        }
    }
}

/// Outcome of classifying one query point.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    /// Whether the point lies within at least one perimeter.
    pub inside: bool,
    /// The containing perimeter if `inside`, otherwise the nearest one. `None` for an empty collection.
    pub nearest_perimeter_id: Option<i64>,
    /// Distance in meters from the point to the center of `nearest_perimeter_id`.
    /// Infinite when there are no perimeters.
    pub nearest_distance: f64,
}

impl ClassificationResult {
    fn empty() -> Self {
        ClassificationResult {
            inside: false,
            nearest_perimeter_id: None,
            nearest_distance: f64::INFINITY,
        }
    }

    /// Looks the reported perimeter up in `perimeters`.
    pub fn nearest<'a>(&self, perimeters: &'a [Perimeter]) -> Option<&'a Perimeter> {
        let id = self.nearest_perimeter_id?;
        perimeters.iter().find(|p| p.id() == id)
    }
}

/// Classifies `point` against `perimeters` using the default `ContainmentPolicy`.
pub fn classify(point: &GeoPoint, perimeters: &[Perimeter]) -> ClassificationResult {
    classify_with(point, perimeters, ContainmentPolicy::default())
}

/// Classifies `point` with a brute-force scan over `perimeters`.
///
/// A point at exactly `radius` meters from a center counts as inside. The globally nearest
/// perimeter is tracked with a strict comparison, so among equidistant perimeters the first
/// one scanned wins.
pub fn classify_with(
    point: &GeoPoint,
    perimeters: &[Perimeter],
    policy: ContainmentPolicy,
) -> ClassificationResult {
    let mut nearest: Option<(i64, f64)> = None;
    let mut containing: Option<(i64, f64)> = None;

    for perimeter in perimeters {
        let dist = point.distance_to(perimeter.center());

        if dist <= perimeter.radius() {
            containing = match (policy, containing) {
                (ContainmentPolicy::ClosestContaining, Some((_, best))) if best <= dist => {
                    containing
                }
                _ => Some((perimeter.id(), dist)),
            };
        }

        if nearest.map_or(true, |(_, min)| dist < min) {
            nearest = Some((perimeter.id(), dist));
        }
    }

    let result = match (containing, nearest) {
        (Some((id, dist)), _) => ClassificationResult {
            inside: true,
            nearest_perimeter_id: Some(id),
            nearest_distance: dist,
        },
        (None, Some((id, dist))) => ClassificationResult {
            inside: false,
            nearest_perimeter_id: Some(id),
            nearest_distance: dist,
        },
        (None, None) => ClassificationResult::empty(),
    };

    log::debug!(
        "Classified ({:.6}, {:.6}) against {} perimeters: inside={}, nearest={:?}, distance={:.2}m",
        point.latitude(),
        point.longitude(),
        perimeters.len(),
        result.inside,
        result.nearest_perimeter_id,
        result.nearest_distance
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geopoint::haversine_distance;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn perimeter(id: i64, lat: f64, lng: f64, radius: f64) -> Perimeter {
        Perimeter::new(id, Some(format!("P{}", id)), point(lat, lng), radius).unwrap()
    }

    #[test]
    fn empty_collection_is_outside_with_no_nearest() {
        let result = classify(&point(10.0, 10.0), &[]);
        assert!(!result.inside);
        assert_eq!(result.nearest_perimeter_id, None);
        assert!(result.nearest_distance.is_infinite());
    }

    #[test]
    fn point_at_center_is_inside() {
        let perimeters = vec![perimeter(1, -2.168931, -79.897686, 10.0)];
        let result = classify(&point(-2.168931, -79.897686), &perimeters);
        assert!(result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(1));
        assert!(result.nearest_distance.abs() < 1e-9);
    }

    #[test]
    fn containing_perimeter_wins_over_far_one() {
        let query = point(0.0, 0.0);
        let perimeters = vec![
            perimeter(1, 0.0, 0.01, 50.0),     // ~1.1 km away
            perimeter(2, 0.0, 0.0002, 50.0),   // ~22 m away
        ];
        let result = classify(&query, &perimeters);
        assert!(result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(2));
    }

    #[test]
    fn outside_reports_globally_nearest() {
        let query = point(0.0, 0.0);
        let perimeters = vec![
            perimeter(1, 0.0, 0.001, 50.0), // ~111 m
            perimeter(2, 0.0, 0.002, 50.0), // ~222 m
        ];
        let result = classify(&query, &perimeters);
        assert!(!result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(1));
        let expected = haversine_distance(&query, perimeters[0].center());
        assert_eq!(result.nearest_distance, expected);
    }

    #[test]
    fn boundary_is_inclusive() {
        let query = point(0.0, 0.0);
        let center = point(0.0, 0.001);
        let radius = haversine_distance(&query, &center);
        let perimeters = vec![Perimeter::new(9, None::<String>, center, radius).unwrap()];
        let result = classify(&query, &perimeters);
        assert!(result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(9));
    }

    #[test]
    fn equidistant_perimeters_report_first_scanned() {
        let query = point(0.0, 0.0);
        let perimeters = vec![
            perimeter(1, 0.0, 0.001, 10.0),
            perimeter(2, 0.0, -0.001, 10.0),
        ];
        let result = classify(&query, &perimeters);
        assert!(!result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(1));
    }

    #[test]
    fn overlapping_perimeters_follow_policy() {
        let query = point(0.0, 0.0);
        let perimeters = vec![
            perimeter(1, 0.0, 0.0001, 500.0), // ~11 m, contains
            perimeter(2, 0.0, 0.001, 500.0),  // ~111 m, contains
            perimeter(3, 0.0, 0.05, 10.0),    // far, outside
        ];

        let closest = classify_with(&query, &perimeters, ContainmentPolicy::ClosestContaining);
        assert!(closest.inside);
        assert_eq!(closest.nearest_perimeter_id, Some(1));

        let last = classify_with(&query, &perimeters, ContainmentPolicy::LastMatch);
        assert!(last.inside);
        assert_eq!(last.nearest_perimeter_id, Some(2));
        let expected = haversine_distance(&query, perimeters[1].center());
        assert_eq!(last.nearest_distance, expected);
    }

    #[test]
    fn large_containing_perimeter_beats_nearer_small_one() {
        let query = point(0.0, 0.0);
        let perimeters = vec![
            perimeter(1, 0.0, 0.0005, 10.0),  // ~55 m, too small to contain
            perimeter(2, 0.0, 0.002, 1000.0), // ~222 m, contains
        ];
        let result = classify(&query, &perimeters);
        assert!(result.inside);
        assert_eq!(result.nearest_perimeter_id, Some(2));
        assert_eq!(result.nearest(&perimeters).map(Perimeter::id), Some(2));
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!(
            "closest".parse::<ContainmentPolicy>().unwrap(),
            ContainmentPolicy::ClosestContaining
        );
        assert_eq!(
            " Last-Match ".parse::<ContainmentPolicy>().unwrap(),
            ContainmentPolicy::LastMatch
        );
        assert!(matches!(
            "nearest".parse::<ContainmentPolicy>(),
            Err(GeofenceError::InvalidConfig(_))
        ));
    }
}
