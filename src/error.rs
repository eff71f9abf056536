// src/error.rs
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeofenceError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid perimeter id: {0}")]
    InvalidPerimeterId(String),

    #[error("Invalid radius for perimeter {id}: {radius}")]
    InvalidRadius { id: i64, radius: f64 },

    #[error("Duplicate perimeter id: {0}")]
    DuplicatePerimeterId(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Unexpected response (HTTP {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GeofenceError {
    /// Creates a `GeofenceError` from an HTTP status code and a JSON response body.
    ///
    /// The locations endpoint is not guaranteed to return structured errors, so the
    /// message is taken from `error` or `message` when present.
    pub(crate) fn from_response(status_code: u16, response_body: Value) -> Self {
        let message = response_body
            .get("error")
            .or_else(|| response_body.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();

        if status_code >= 500 {
            GeofenceError::InternalServerError(format!(
                "Server error (HTTP {}): {}",
                status_code, message
            ))
        } else if status_code == 401 || status_code == 403 {
            GeofenceError::AuthenticationError(format!(
                "Auth error (HTTP {}): {}",
                status_code, message
            ))
        } else if status_code == 404 {
            GeofenceError::NotFound(format!("Not found (HTTP {}): {}", status_code, message))
        } else {
            GeofenceError::UnexpectedResponse {
                status: status_code,
                message,
            }
        }
    }
}
