//! Axum router construction for the observer listener.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so a browser overlay served from anywhere can poll
//! the status endpoint.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the observer listener.
///
/// The router includes:
/// - `GET /` -- `WebSocket` observer stream
/// - `GET /ws` -- same stream under an explicit path
/// - `GET /api/status` -- bridge status
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ws::ws_observe))
        .route("/ws", get(ws::ws_observe))
        .route("/api/status", get(handlers::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
