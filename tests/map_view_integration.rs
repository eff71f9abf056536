// tests/map_view_integration.rs
use geofence_rs::{ContainmentPolicy, GeofenceConfig, MapView, PerimeterStore};
use std::sync::Arc;

use test_utils::shared::{client_for, sample_collection, spawn_stub_server, unreachable_client, StubResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_then_classify_clicks() {
        let url = spawn_stub_server(vec![StubResponse::ok(sample_collection())]).await;
        let client = client_for(&url);
        let store = Arc::new(PerimeterStore::new());

        let loaded = store.refresh(&client).await.expect("Refresh failed");
        assert_eq!(loaded, 2);

        let mut view = MapView::new(Arc::clone(&store));
        assert_eq!(view.overlays().len(), 2);

        let inside = view.select_lat_lng(-2.168931, -79.897686).unwrap();
        assert!(inside.inside);
        assert_eq!(inside.nearest_name.as_deref(), Some("Rectorate"));
        assert_eq!(inside.message, "Inside the perimeter of Rectorate");

        let outside = view.select_lat_lng(-2.180000, -79.910000).unwrap();
        assert!(!outside.inside);
        assert_eq!(outside.nearest_name, None);
        assert_eq!(outside.nearest_perimeter_id, Some(2));
        assert_eq!(outside.message, "Outside all perimeters");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_existing_perimeters() {
        let url = spawn_stub_server(vec![
            StubResponse::ok(sample_collection()),
            StubResponse::status(503, "Service Unavailable", r#"{"error":"maintenance"}"#),
        ])
        .await;
        let client = client_for(&url);
        let store = PerimeterStore::new();

        store.refresh(&client).await.expect("First refresh failed");
        let before = store.snapshot();

        let second = store.refresh(&client).await;
        assert!(second.is_err(), "Second refresh should fail");
        assert_eq!(store.len(), 2);
        assert_eq!(*store.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_unreachable_source_degrades_to_outside() {
        let client = unreachable_client().await;
        let store = Arc::new(PerimeterStore::new());

        assert!(store.refresh(&client).await.is_err());
        assert!(store.is_empty());

        let mut view = MapView::new(store);
        let instruction = view.select_lat_lng(-2.168931, -79.897686).unwrap();
        assert!(!instruction.inside);
        assert_eq!(instruction.nearest_perimeter_id, None);
        assert_eq!(
            view.last_result().map(|r| r.nearest_distance.is_infinite()),
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_policy_from_config_applies_to_overlaps() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                { "properties": { "id": 10, "name": "Campus", "radius_perimeter": 1000 },
                  "geometry": { "coordinates": [0.0, 0.0] } },
                { "properties": { "id": 20, "name": "Annex", "radius_perimeter": 1000 },
                  "geometry": { "coordinates": [0.005, 0.0] } }
            ]
        })
        .to_string();
        let url = spawn_stub_server(vec![StubResponse::ok(body)]).await;
        let config = GeofenceConfig {
            locations_url: url,
            containment_policy: ContainmentPolicy::LastMatch,
            ..GeofenceConfig::default()
        };
        let client = geofence_rs::PerimeterClient::from_config(&config).unwrap();
        let store = Arc::new(PerimeterStore::new());
        store.refresh(&client).await.expect("Refresh failed");

        // ~111 m from Campus, ~445 m from Annex: inside both.
        let mut last_match = MapView::with_config(Arc::clone(&store), &config);
        let result = last_match.select_lat_lng(0.0, 0.001).unwrap();
        assert_eq!(result.nearest_name.as_deref(), Some("Annex"));

        let mut closest =
            MapView::with_config(store, &config).with_policy(ContainmentPolicy::ClosestContaining);
        let result = closest.select_lat_lng(0.0, 0.001).unwrap();
        assert_eq!(result.nearest_name.as_deref(), Some("Campus"));
    }
}
