//! REST endpoint handlers for the observer listener.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/status` | Bridge status and listener uptime |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use overlay_types::BridgeStatus;
use serde::Serialize;

use crate::error::ObserverError;
use crate::state::AppState;

/// Response body for `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current bridge state.
    #[serde(flatten)]
    pub bridge: BridgeStatus,
    /// Seconds since the listener started.
    pub uptime_seconds: u64,
}

/// Report the bridge's cached state.
///
/// # Errors
///
/// Returns [`ObserverError::BridgeUnavailable`] (503) if the bridge loop
/// has stopped.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ObserverError> {
    let bridge = state.bridge.status().await?;
    Ok(Json(StatusResponse {
        bridge,
        uptime_seconds: state.uptime_seconds(),
    }))
}
