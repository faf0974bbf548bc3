//! Error types for the observer listener.
//!
//! [`ObserverError`] covers the HTTP-facing failures and converts into an
//! Axum response via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use overlay_core::runner::BridgeError;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The bridge loop is not running.
    #[error("bridge unavailable: {0}")]
    BridgeUnavailable(#[from] BridgeError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BridgeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
