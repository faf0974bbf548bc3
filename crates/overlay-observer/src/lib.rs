//! Observer listener for the spectate overlay bridge.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/`, also `/ws`) that turns every accepted
//!   socket into an observer channel registered with the bridge loop
//! - **Status endpoint** (`/api/status`) reporting the bridge's cached
//!   state and observer count
//!
//! # Architecture
//!
//! The listener never touches bridge state directly. Each accepted socket
//! gets a [`QueuedChannel`]; the channel is handed to the bridge loop
//! through a [`BridgeHandle`], and a per-socket writer task drains the
//! channel's queue into text frames. Inbound frames are logged and
//! otherwise ignored.
//!
//! [`QueuedChannel`]: overlay_core::channel::QueuedChannel
//! [`BridgeHandle`]: overlay_core::runner::BridgeHandle

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve};
pub use startup::{ObserverServer, spawn_observer};
pub use state::AppState;
