//! Upstream event payloads.
//!
//! The event source publishes four kinds of event. Each payload struct
//! mirrors what the source delivers; [`SourceEvent`] is the tagged union
//! the bridge dispatches on, and [`EventKind`] is its fieldless tag used
//! for registration and routing.
//!
//! Every field is required. A payload missing one fails to decode and is
//! dropped before it reaches the bridge.

use serde::{Deserialize, Serialize};

use crate::controls::ControllerState;
use crate::ids::PlayerIndex;
use crate::messages::PlayerInfo;

/// The spectator camera moved to a different player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectateChange {
    /// The newly spectated player.
    pub player_index: PlayerIndex,
    /// Game time in seconds when the change happened.
    pub seconds: f32,
    /// Frame number when the change happened.
    pub frame_num: u64,
}

/// A player's controller state changed on some frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputChange {
    /// The player whose input changed.
    pub player_index: PlayerIndex,
    /// Game time in seconds.
    pub seconds: f32,
    /// Frame number.
    pub frame_num: u64,
    /// The new controller state.
    pub controller_state: ControllerState,
}

/// Per-tick world snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTick {
    /// Whether a round is currently in progress.
    pub round_active: bool,
    /// All players in slot order.
    pub players: Vec<PlayerInfo>,
}

/// A player earned a stat (goal, save, demolition, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// The player that earned the stat.
    pub player_index: PlayerIndex,
    /// Upstream stat name.
    pub stat_type: String,
    /// Game time in seconds.
    pub seconds: f32,
    /// Frame number.
    pub frame_num: u64,
}

/// Fieldless tag for each upstream event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`SpectateChange`].
    Spectate,
    /// [`InputChange`].
    InputChange,
    /// [`WorldTick`].
    WorldTick,
    /// [`PlayerStat`].
    PlayerStat,
}

impl EventKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 4] = [
        Self::Spectate,
        Self::InputChange,
        Self::WorldTick,
        Self::PlayerStat,
    ];

    /// Routing name used as the last segment of a pub/sub subject.
    pub const fn subject_suffix(self) -> &'static str {
        match self {
            Self::Spectate => "spectate",
            Self::InputChange => "input",
            Self::WorldTick => "tick",
            Self::PlayerStat => "stat",
        }
    }

    /// Inverse of [`subject_suffix`](Self::subject_suffix).
    pub fn from_subject_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.subject_suffix() == suffix)
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.subject_suffix())
    }
}

/// One upstream event of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// Spectator camera change.
    Spectate(SpectateChange),
    /// Controller input change.
    InputChange(InputChange),
    /// World snapshot.
    WorldTick(WorldTick),
    /// Player stat.
    PlayerStat(PlayerStat),
}

impl SourceEvent {
    /// The tag of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Spectate(_) => EventKind::Spectate,
            Self::InputChange(_) => EventKind::InputChange,
            Self::WorldTick(_) => EventKind::WorldTick,
            Self::PlayerStat(_) => EventKind::PlayerStat,
        }
    }
}
