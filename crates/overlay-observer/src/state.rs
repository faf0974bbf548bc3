//! Shared application state for the observer listener.

use chrono::{DateTime, Utc};
use overlay_core::channel::QueuedChannel;
use overlay_core::runner::BridgeHandle;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. Holds no bridge state itself, only the handle used to
/// reach the bridge loop.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Command handle into the bridge loop.
    pub bridge: BridgeHandle<QueuedChannel>,
    /// When the listener state was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state around a bridge handle.
    pub fn new(bridge: BridgeHandle<QueuedChannel>) -> Self {
        Self {
            bridge,
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        u64::try_from(elapsed.num_seconds()).unwrap_or(0)
    }
}
