//! Outbound observer messages.
//!
//! Observers receive three message shapes, distinguished by which key is
//! present:
//!
//! | Shape | JSON |
//! |-------|------|
//! | Spectate | `{"spectating": 2}` |
//! | Roster | `{"players": [{"name": "Nova"}]}` |
//! | Input | `{"idx": 2, "ctrl": {"jm": 1, ...}}` |
//!
//! [`BridgeStatus`] is not pushed to observers; it is served by the
//! status endpoint for diagnostics.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::controls::WireControls;
use crate::ids::PlayerIndex;

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerInfo {
    /// Display name.
    pub name: String,
}

impl PlayerInfo {
    /// Create a roster entry with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered list of participants for the current round.
pub type Roster = Vec<PlayerInfo>;

/// A message pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum OutboundMessage {
    /// The spectated player changed (or replay of the current one).
    Spectating {
        /// Currently spectated player.
        spectating: PlayerIndex,
    },
    /// A round started (or replay of the current roster).
    Players {
        /// Roster for the round.
        players: Roster,
    },
    /// The focused player's controls changed.
    Input {
        /// Player whose controls these are.
        idx: PlayerIndex,
        /// Encoded controls.
        ctrl: WireControls,
    },
}

/// Read-only projection of the bridge state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BridgeStatus {
    /// Currently spectated player.
    pub focused_player: PlayerIndex,
    /// Roster captured at the last round start.
    pub roster: Roster,
    /// Round flag as of the last world tick.
    pub round_active: bool,
    /// Number of registered observer connections.
    #[ts(type = "number")]
    pub observers: usize,
    /// Upstream events dispatched since startup.
    #[ts(type = "number")]
    pub events_processed: u64,
}
