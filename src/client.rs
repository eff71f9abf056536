// src/client.rs

use crate::config::GeofenceConfig;
use crate::error::GeofenceError;
use crate::geojson::FeatureCollection;
use crate::perimeter::PerimeterSet;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the endpoint that publishes perimeter definitions.
///
/// The endpoint answers `GET` with a GeoJSON `FeatureCollection` whose features carry
/// `id`, `name` and `radius_perimeter` properties and a `Point` geometry. Every feature is
/// validated before it reaches the classifier; see [`FeatureCollection::into_perimeters`].
///
/// ```rust,no_run
/// use geofence_rs::{GeofenceError, PerimeterClient};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), GeofenceError> {
/// let client = PerimeterClient::new("localhost:8080/api/locations", Duration::from_secs(5))?;
/// let perimeters = client.fetch_perimeters().await?;
/// println!("loaded {} perimeters", perimeters.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PerimeterClient {
    pub(crate) locations_url: Url,
    pub(crate) http_client: Client,
}

impl PerimeterClient {
    /// Creates a new `PerimeterClient`.
    ///
    /// # Arguments
    ///
    /// * `locations_url`: Full URL of the locations endpoint. `http://` is assumed when no
    ///   scheme is given.
    /// * `timeout`: Applied to every request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the client, or a `GeofenceError` if the URL is unusable or the
    /// underlying HTTP client cannot be built.
    pub fn new(locations_url: &str, timeout: Duration) -> Result<Self, GeofenceError> {
        let mut temp_url_string = locations_url.trim().to_string();

        // Ensure scheme is present
        if !temp_url_string.starts_with("http://") && !temp_url_string.starts_with("https://") {
            temp_url_string = format!("http://{}", temp_url_string);
        }

        let parsed_url = Url::parse(&temp_url_string)?;

        if parsed_url.cannot_be_a_base() || parsed_url.host_str().is_none() {
            return Err(GeofenceError::InvalidUrl(format!(
                "The locations_url '{}' resolved to '{}', which has no host.",
                locations_url, parsed_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/geo+json, application/json"),
        );

        let http_client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(GeofenceError::ReqwestError)?;

        log::debug!("PerimeterClient initialized for {}", parsed_url);

        Ok(Self {
            locations_url: parsed_url,
            http_client,
        })
    }

    /// Creates a client from the `locations_url` and `timeout` of a configuration.
    pub fn from_config(config: &GeofenceConfig) -> Result<Self, GeofenceError> {
        Self::new(&config.locations_url, config.timeout)
    }

    pub fn locations_url(&self) -> &Url {
        &self.locations_url
    }

    /// Fetches the raw feature collection without validating individual features.
    pub async fn fetch_feature_collection(&self) -> Result<FeatureCollection, GeofenceError> {
        log::debug!("Fetching perimeters: Method=GET, URL={}", self.locations_url);

        let response = self
            .http_client
            .get(self.locations_url.clone())
            .send()
            .await
            .map_err(GeofenceError::ReqwestError)?;

        let status = response.status();
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("--- Locations Response ---");
            log::debug!("Status: {}", status);
            for (name, value) in response.headers() {
                log::debug!("Header: {}: {:?}", name, value);
            }
        }

        let body_bytes = response.bytes().await.map_err(GeofenceError::ReqwestError)?;

        if status.is_success() {
            log::debug!(
                "Request successful. Response body: {}",
                String::from_utf8_lossy(&body_bytes)
            );
            FeatureCollection::from_slice(&body_bytes)
        } else {
            let error_body_string = String::from_utf8_lossy(&body_bytes).to_string();
            log::warn!(
                "Request failed with status {} and body: {}",
                status,
                error_body_string
            );
            match serde_json::from_slice::<Value>(&body_bytes) {
                Ok(json_value) => Err(GeofenceError::from_response(status.as_u16(), json_value)),
                Err(_) => {
                    let fallback_json = serde_json::json!({
                        "error": error_body_string.chars().take(100).collect::<String>()
                    });
                    Err(GeofenceError::from_response(status.as_u16(), fallback_json))
                }
            }
        }
    }

    /// Fetches the perimeter collection and validates it.
    ///
    /// Malformed features are skipped (and logged); only transport errors, non-2xx
    /// responses and bodies that are not a feature collection fail the call.
    pub async fn fetch_perimeters(&self) -> Result<PerimeterSet, GeofenceError> {
        let collection = self.fetch_feature_collection().await?;
        Ok(collection.into_perimeters())
    }
}
