//! Last-known state needed to bring a new observer up to date.
//!
//! [`StateCache`] is owned by the event bridge (single writer). It is a
//! plain struct: every operation is O(1) and none can fail. Values are
//! stored exactly as delivered by the event source; nothing is validated
//! here.

use overlay_types::{PlayerIndex, PlayerInfo, Roster};

/// Focused player, current roster, and the round-active edge detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateCache {
    focused_player: PlayerIndex,
    round_active: bool,
    roster: Roster,
}

impl StateCache {
    /// Create an empty cache: player 0 focused, no round, empty roster.
    pub const fn new() -> Self {
        Self {
            focused_player: PlayerIndex(0),
            round_active: false,
            roster: Vec::new(),
        }
    }

    /// The currently spectated player.
    pub const fn focused_player(&self) -> PlayerIndex {
        self.focused_player
    }

    /// Record a spectate change.
    pub const fn set_focused_player(&mut self, idx: PlayerIndex) {
        self.focused_player = idx;
    }

    /// The roster captured at the most recent round start.
    pub fn roster(&self) -> &[PlayerInfo] {
        &self.roster
    }

    /// Replace the roster wholesale.
    pub fn set_roster(&mut self, roster: Roster) {
        self.roster = roster;
    }

    /// Round flag as of the last world tick.
    pub const fn is_round_active(&self) -> bool {
        self.round_active
    }

    /// Record the round flag from a world tick.
    pub const fn set_round_active(&mut self, active: bool) {
        self.round_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_player_zero_with_no_round() {
        let cache = StateCache::new();
        assert_eq!(cache.focused_player(), PlayerIndex(0));
        assert!(!cache.is_round_active());
        assert!(cache.roster().is_empty());
        assert_eq!(cache, StateCache::default());
    }

    #[test]
    fn setters_overwrite() {
        let mut cache = StateCache::new();
        cache.set_focused_player(PlayerIndex(4));
        cache.set_round_active(true);
        cache.set_roster(vec![PlayerInfo::new("A"), PlayerInfo::new("B")]);
        cache.set_roster(vec![PlayerInfo::new("C")]);

        assert_eq!(cache.focused_player(), PlayerIndex(4));
        assert!(cache.is_round_active());
        assert_eq!(cache.roster(), &[PlayerInfo::new("C")]);
    }
}
