//! Shared type definitions for the spectate overlay bridge.
//!
//! This crate is the single source of truth for the data that flows
//! through the bridge: upstream simulation events on one side, and the
//! JSON messages pushed to observers on the other. Observer-facing types
//! are exported to `TypeScript` via `ts-rs` for the browser overlay.
//!
//! # Modules
//!
//! - [`ids`] -- Player slot index and per-connection observer identifier
//! - [`controls`] -- Controller state as delivered upstream and as sent on the wire
//! - [`events`] -- Upstream event payloads and their tagged union
//! - [`messages`] -- Outbound observer messages and the bridge status projection

pub mod controls;
pub mod events;
pub mod ids;
pub mod messages;

// Re-export all public types at crate root for convenience.
pub use controls::{ControllerState, WireControls};
pub use events::{EventKind, InputChange, PlayerStat, SourceEvent, SpectateChange, WorldTick};
pub use ids::{ObserverId, PlayerIndex};
pub use messages::{BridgeStatus, OutboundMessage, PlayerInfo, Roster};
