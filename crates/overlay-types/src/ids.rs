//! Identifier types.
//!
//! [`PlayerIndex`] is the upstream participant slot. It is only stable
//! for the lifetime of a round and is never globally unique.
//! [`ObserverId`] tags one accepted observer connection and uses UUID v7
//! so log lines sort by accept time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Participant slot index as delivered by the event source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerIndex(#[ts(type = "number")] pub u32);

impl PlayerIndex {
    /// Return the raw slot number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
