//! The event bridge: upstream events in, observer messages out.
//!
//! [`EventBridge`] owns the [`StateCache`] and the [`Broadcaster`]. It is
//! the only writer of either, and every method runs to completion without
//! awaiting, so a broadcast triggered by one event is fully queued before
//! the next event is handled.
//!
//! # Handlers
//!
//! | Event | Cache update | Broadcast |
//! |-------|--------------|-----------|
//! | spectate | focused player | `{"spectating": idx}` |
//! | world tick, round false→true | roster, round flag | `{"players": [...]}` |
//! | world tick, any other edge | round flag | none |
//! | input change, focused player | none | `{"idx": idx, "ctrl": {...}}` |
//! | input change, other player | none | none |
//! | player stat | none | none (logged) |

use overlay_types::{
    BridgeStatus, EventKind, InputChange, OutboundMessage, PlayerStat, SourceEvent,
    SpectateChange, WireControls, WorldTick,
};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::cache::StateCache;
use crate::channel::ObserverChannel;
use crate::registry::BroadcastReport;
use crate::source::EventSource;

/// Register every event kind the bridge handles with `source`.
pub fn register_handlers<S: EventSource>(source: &mut S) {
    for kind in EventKind::ALL {
        source.register(kind);
    }
}

/// Maps upstream events to cache mutations and observer broadcasts.
#[derive(Debug)]
pub struct EventBridge<C> {
    cache: StateCache,
    broadcaster: Broadcaster<C>,
    events_processed: u64,
}

impl<C> Default for EventBridge<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventBridge<C> {
    /// Create a bridge with an empty cache and no observers.
    pub const fn new() -> Self {
        Self {
            cache: StateCache::new(),
            broadcaster: Broadcaster::new(),
            events_processed: 0,
        }
    }

    /// Read-only view of the cached state.
    pub const fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Messages that bring a new observer up to date, in send order.
    pub fn replay(&self) -> [OutboundMessage; 2] {
        [
            OutboundMessage::Spectating {
                spectating: self.cache.focused_player(),
            },
            OutboundMessage::Players {
                players: self.cache.roster().to_vec(),
            },
        ]
    }

    /// Snapshot of the bridge for diagnostics.
    pub fn status(&self) -> BridgeStatus {
        BridgeStatus {
            focused_player: self.cache.focused_player(),
            roster: self.cache.roster().to_vec(),
            round_active: self.cache.is_round_active(),
            observers: self.broadcaster.observer_count(),
            events_processed: self.events_processed,
        }
    }
}

impl<C: ObserverChannel> EventBridge<C> {
    /// Route one upstream event to its handler.
    ///
    /// Returns the broadcast report if the event produced a message.
    pub fn dispatch(&mut self, event: &SourceEvent) -> Option<BroadcastReport> {
        self.events_processed = self.events_processed.saturating_add(1);
        match event {
            SourceEvent::Spectate(change) => Some(self.on_spectate(change)),
            SourceEvent::WorldTick(tick) => self.on_world_tick(tick),
            SourceEvent::InputChange(change) => self.on_input_change(change),
            SourceEvent::PlayerStat(stat) => {
                Self::on_player_stat(stat);
                None
            }
        }
    }

    /// The spectator camera moved: remember it and tell every observer.
    ///
    /// Spectating never sends anything back to the simulation.
    pub fn on_spectate(&mut self, change: &SpectateChange) -> BroadcastReport {
        info!(player = %change.player_index, frame = change.frame_num, "Spectating player");
        self.cache.set_focused_player(change.player_index);
        self.broadcaster
            .publish(&OutboundMessage::Spectating {
                spectating: change.player_index,
            })
            .unwrap_or_default()
    }

    /// Edge-detect round start and publish the fresh roster on false→true.
    pub fn on_world_tick(&mut self, tick: &WorldTick) -> Option<BroadcastReport> {
        let round_started = tick.round_active && !self.cache.is_round_active();
        // Only after the comparison, or the transition is never seen.
        self.cache.set_round_active(tick.round_active);

        if !round_started {
            return None;
        }

        info!(players = tick.players.len(), "Round started");
        self.cache.set_roster(tick.players.clone());
        self.check_focus_in_roster();

        self.broadcaster.publish(&OutboundMessage::Players {
            players: tick.players.clone(),
        })
    }

    /// Forward the focused player's controls; drop everyone else's.
    pub fn on_input_change(&mut self, change: &InputChange) -> Option<BroadcastReport> {
        if change.player_index != self.cache.focused_player() {
            return None;
        }
        if change.controller_state.jump {
            debug!(player = %change.player_index, "Focused player is jumping");
        }
        self.broadcaster.publish(&OutboundMessage::Input {
            idx: change.player_index,
            ctrl: WireControls::from(&change.controller_state),
        })
    }

    /// Stats are logged for operators and never forwarded.
    pub fn on_player_stat(stat: &PlayerStat) {
        info!(player = %stat.player_index, stat = %stat.stat_type, "Player stat");
    }

    /// Register a newly accepted observer and replay current state to it.
    ///
    /// Returns `false` if the observer was already registered.
    pub fn accept(&mut self, channel: C) -> bool {
        let observer = channel.id();
        let replay = self.replay();
        let added = self.broadcaster.attach(channel, &replay);
        if added {
            info!(
                %observer,
                focused = %self.cache.focused_player(),
                roster = self.cache.roster().len(),
                observers = self.broadcaster.observer_count(),
                "Observer connected"
            );
        }
        added
    }

    /// Player indices are not re-validated upstream across rounds; warn
    /// when the focused slot does not exist in the new roster.
    fn check_focus_in_roster(&self) {
        let focused = self.cache.focused_player();
        let in_range = usize::try_from(focused.get())
            .is_ok_and(|idx| idx < self.cache.roster().len());
        if !in_range {
            warn!(
                focused = %focused,
                roster = self.cache.roster().len(),
                "Focused player is not in the new roster"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use overlay_types::{ControllerState, PlayerIndex, PlayerInfo};
    use serde_json::{Value, json};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::channel::{Payload, QueuedChannel};

    fn drain(rx: &mut UnboundedReceiver<Payload>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(p) = rx.try_recv() {
            out.push(serde_json::from_str(&p).unwrap());
        }
        out
    }

    fn spectate(idx: u32) -> SourceEvent {
        SourceEvent::Spectate(SpectateChange {
            player_index: PlayerIndex(idx),
            seconds: 0.0,
            frame_num: 0,
        })
    }

    fn tick(active: bool, names: &[&str]) -> SourceEvent {
        SourceEvent::WorldTick(WorldTick {
            round_active: active,
            players: names.iter().map(|n| PlayerInfo::new(*n)).collect(),
        })
    }

    fn input(idx: u32, jump: bool) -> SourceEvent {
        SourceEvent::InputChange(InputChange {
            player_index: PlayerIndex(idx),
            seconds: 0.0,
            frame_num: 0,
            controller_state: ControllerState {
                jump,
                ..ControllerState::default()
            },
        })
    }

    fn bridge_with_observer() -> (EventBridge<QueuedChannel>, UnboundedReceiver<Payload>) {
        let mut bridge = EventBridge::new();
        let (chan, mut rx) = QueuedChannel::new();
        assert!(bridge.accept(chan));
        // Discard the connect replay.
        assert_eq!(drain(&mut rx).len(), 2);
        (bridge, rx)
    }

    #[test]
    fn spectate_updates_cache_and_broadcasts_once() {
        let (mut bridge, mut rx) = bridge_with_observer();

        for idx in [2, 0, 5] {
            bridge.dispatch(&spectate(idx));
            assert_eq!(bridge.cache().focused_player(), PlayerIndex(idx));
            assert_eq!(drain(&mut rx), vec![json!({ "spectating": idx })]);
        }
    }

    #[test]
    fn roster_broadcast_only_on_false_to_true() {
        let (mut bridge, mut rx) = bridge_with_observer();

        bridge.dispatch(&tick(false, &["A"]));
        assert!(drain(&mut rx).is_empty());

        bridge.dispatch(&tick(true, &["A", "B"]));
        assert_eq!(
            drain(&mut rx),
            vec![json!({ "players": [{ "name": "A" }, { "name": "B" }] })]
        );

        bridge.dispatch(&tick(true, &["A", "B", "C"]));
        assert!(drain(&mut rx).is_empty());

        bridge.dispatch(&tick(false, &[]));
        assert!(drain(&mut rx).is_empty());

        bridge.dispatch(&tick(true, &["D"]));
        assert_eq!(drain(&mut rx), vec![json!({ "players": [{ "name": "D" }] })]);
    }

    #[test]
    fn repeated_active_ticks_leave_roster_untouched() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&tick(true, &["A", "B"]));
        drain(&mut rx);

        for _ in 0..5 {
            bridge.dispatch(&tick(true, &["X"]));
        }
        assert!(drain(&mut rx).is_empty());
        assert_eq!(
            bridge.cache().roster(),
            &[PlayerInfo::new("A"), PlayerInfo::new("B")]
        );
    }

    #[test]
    fn first_tick_active_counts_as_round_start() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&tick(true, &["Solo"]));
        assert_eq!(
            drain(&mut rx),
            vec![json!({ "players": [{ "name": "Solo" }] })]
        );
        assert!(bridge.cache().is_round_active());
    }

    #[test]
    fn input_from_unfocused_player_is_dropped() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&spectate(1));
        drain(&mut rx);
        let before = bridge.cache().clone();

        assert!(bridge.dispatch(&input(4, true)).is_none());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(bridge.cache(), &before);
    }

    #[test]
    fn input_from_focused_player_is_forwarded() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&spectate(1));
        drain(&mut rx);

        let report = bridge.dispatch(&input(1, true)).unwrap();
        assert_eq!(report.delivered, 1);

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        let msg = messages.first().unwrap();
        assert_eq!(msg["idx"], json!(1));
        assert_eq!(msg["ctrl"]["jm"], json!(1));
        assert_eq!(msg["ctrl"]["us"], json!(0));
    }

    #[test]
    fn player_zero_is_focused_by_default() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&input(0, false));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn stats_are_not_broadcast() {
        let (mut bridge, mut rx) = bridge_with_observer();
        let stat = SourceEvent::PlayerStat(PlayerStat {
            player_index: PlayerIndex(0),
            stat_type: String::from("Goal"),
            seconds: 12.0,
            frame_num: 720,
        });
        assert!(bridge.dispatch(&stat).is_none());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(bridge.status().events_processed, 1);
    }

    #[test]
    fn late_joiner_gets_spectate_then_roster() {
        let mut bridge: EventBridge<QueuedChannel> = EventBridge::new();
        bridge.dispatch(&tick(true, &["A", "B"]));
        bridge.dispatch(&spectate(3));

        let (chan, mut rx) = QueuedChannel::new();
        bridge.accept(chan);

        assert_eq!(
            drain(&mut rx),
            vec![
                json!({ "spectating": 3 }),
                json!({ "players": [{ "name": "A" }, { "name": "B" }] }),
            ]
        );
    }

    #[test]
    fn replay_before_any_round_has_empty_roster() {
        let mut bridge: EventBridge<QueuedChannel> = EventBridge::new();
        let (chan, mut rx) = QueuedChannel::new();
        bridge.accept(chan);
        assert_eq!(
            drain(&mut rx),
            vec![json!({ "spectating": 0 }), json!({ "players": [] })]
        );
    }

    #[test]
    fn replay_is_not_sent_to_existing_observers() {
        let (mut bridge, mut rx_old) = bridge_with_observer();
        let (chan, _rx_new) = QueuedChannel::new();
        bridge.accept(chan);
        assert!(drain(&mut rx_old).is_empty());
    }

    #[test]
    fn closed_observer_is_pruned_on_next_broadcast() {
        let (mut bridge, mut rx_live) = bridge_with_observer();
        let (chan, rx_gone) = QueuedChannel::new();
        bridge.accept(chan);
        assert_eq!(bridge.status().observers, 2);

        drop(rx_gone);
        let report = bridge.dispatch(&spectate(1)).unwrap();
        assert_eq!(report.pruned, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(bridge.status().observers, 1);

        let messages = drain(&mut rx_live);
        assert_eq!(messages.last(), Some(&json!({ "spectating": 1 })));
    }

    #[test]
    fn example_scenario_produces_three_messages_in_order() {
        let (mut bridge, mut rx) = bridge_with_observer();

        bridge.dispatch(&spectate(2));
        bridge.dispatch(&tick(false, &[]));
        bridge.dispatch(&tick(true, &["Nova"]));
        bridge.dispatch(&input(2, true));

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages.first(), Some(&json!({ "spectating": 2 })));
        assert_eq!(
            messages.get(1),
            Some(&json!({ "players": [{ "name": "Nova" }] }))
        );
        let last = messages.get(2).unwrap();
        assert_eq!(last["idx"], json!(2));
        assert_eq!(last["ctrl"]["jm"], json!(1));
    }

    #[test]
    fn focus_outside_new_roster_is_kept() {
        let (mut bridge, mut rx) = bridge_with_observer();
        bridge.dispatch(&spectate(7));
        bridge.dispatch(&tick(true, &["A"]));
        assert_eq!(bridge.cache().focused_player(), PlayerIndex(7));
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn status_reflects_cache() {
        let (mut bridge, _rx) = bridge_with_observer();
        bridge.dispatch(&spectate(1));
        bridge.dispatch(&tick(true, &["A", "B"]));

        let status = bridge.status();
        assert_eq!(status.focused_player, PlayerIndex(1));
        assert_eq!(status.roster.len(), 2);
        assert!(status.round_active);
        assert_eq!(status.observers, 1);
        assert_eq!(status.events_processed, 2);
    }

    #[test]
    fn registers_every_kind() {
        let (mut source, _handle) = crate::source::MemorySource::new();
        register_handlers(&mut source);
        assert_eq!(source.registered().len(), EventKind::ALL.len());
    }
}
