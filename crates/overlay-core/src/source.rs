//! Upstream event source abstraction.
//!
//! An [`EventSource`] delivers typed [`SourceEvent`]s in order. The bridge
//! declares the kinds it handles with [`EventSource::register`]; the
//! source only yields events of registered kinds. Dispatch to the right
//! handler is a `match` on the event variant inside the bridge.
//!
//! [`decode_event`] is the one place raw upstream JSON becomes a typed
//! event, so every transport reports a missing field the same way.
//!
//! [`MemorySource`] is an in-process source fed through a
//! [`MemorySourceHandle`], used when embedding the bridge and in tests.

use std::collections::BTreeSet;
use std::future::Future;

use overlay_types::{EventKind, SourceEvent};
use tokio::sync::mpsc;
use tracing::trace;

/// Errors reported by an event source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached. Fatal at startup.
    #[error("event source unavailable: {message}")]
    Unavailable {
        /// Description of the connection failure.
        message: String,
    },

    /// One event could not be decoded. The event is dropped.
    #[error("malformed {kind} event: {message}")]
    Malformed {
        /// Kind the payload claimed to be.
        kind: EventKind,
        /// Decoder error.
        message: String,
    },

    /// A transient transport problem while running.
    #[error("event source transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

/// A stream of upstream simulation events.
pub trait EventSource: Send {
    /// Declare interest in one kind of event.
    fn register(&mut self, kind: EventKind);

    /// Wait for the next event of a registered kind.
    ///
    /// Returns `None` once the source has ended. The bridge loop may drop
    /// the returned future before it completes, so an event already taken
    /// off the transport must be returned without awaiting again.
    fn next_event(
        &mut self,
    ) -> impl Future<Output = Option<Result<SourceEvent, SourceError>>> + Send;
}

/// Decode a raw JSON payload of the given kind.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] if the payload is not valid JSON or
/// is missing a required field.
pub fn decode_event(kind: EventKind, payload: &[u8]) -> Result<SourceEvent, SourceError> {
    let decoded = match kind {
        EventKind::Spectate => serde_json::from_slice(payload).map(SourceEvent::Spectate),
        EventKind::InputChange => serde_json::from_slice(payload).map(SourceEvent::InputChange),
        EventKind::WorldTick => serde_json::from_slice(payload).map(SourceEvent::WorldTick),
        EventKind::PlayerStat => serde_json::from_slice(payload).map(SourceEvent::PlayerStat),
    };
    decoded.map_err(|e| SourceError::Malformed {
        kind,
        message: e.to_string(),
    })
}

/// Something pushed into a [`MemorySource`].
#[derive(Debug)]
enum Item {
    Event(SourceEvent),
    Raw { kind: EventKind, payload: Vec<u8> },
    Fault(SourceError),
}

/// In-process event source.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Item>,
    registered: BTreeSet<EventKind>,
}

/// Producer side of a [`MemorySource`]. Dropping every handle ends the
/// source.
#[derive(Debug, Clone)]
pub struct MemorySourceHandle {
    tx: mpsc::UnboundedSender<Item>,
}

impl MemorySource {
    /// Create a source and its producer handle.
    pub fn new() -> (Self, MemorySourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx,
                registered: BTreeSet::new(),
            },
            MemorySourceHandle { tx },
        )
    }

    /// Kinds registered so far.
    pub const fn registered(&self) -> &BTreeSet<EventKind> {
        &self.registered
    }
}

impl EventSource for MemorySource {
    fn register(&mut self, kind: EventKind) {
        self.registered.insert(kind);
    }

    async fn next_event(&mut self) -> Option<Result<SourceEvent, SourceError>> {
        loop {
            match self.rx.recv().await? {
                Item::Event(event) => {
                    if self.registered.contains(&event.kind()) {
                        return Some(Ok(event));
                    }
                    trace!(kind = %event.kind(), "Skipping unregistered event");
                }
                Item::Raw { kind, payload } => {
                    if self.registered.contains(&kind) {
                        return Some(decode_event(kind, &payload));
                    }
                    trace!(%kind, "Skipping unregistered event");
                }
                Item::Fault(error) => return Some(Err(error)),
            }
        }
    }
}

impl MemorySourceHandle {
    /// Push a typed event. Returns `false` if the source is gone.
    pub fn push(&self, event: SourceEvent) -> bool {
        self.tx.send(Item::Event(event)).is_ok()
    }

    /// Push a raw JSON payload to be decoded by the source.
    pub fn push_raw(&self, kind: EventKind, payload: impl Into<Vec<u8>>) -> bool {
        self.tx
            .send(Item::Raw {
                kind,
                payload: payload.into(),
            })
            .is_ok()
    }

    /// Make the source report an error.
    pub fn push_error(&self, error: SourceError) -> bool {
        self.tx.send(Item::Fault(error)).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use overlay_types::{PlayerIndex, SpectateChange, WorldTick};

    use super::*;

    #[test]
    fn decodes_each_kind() {
        let event = decode_event(
            EventKind::Spectate,
            br#"{"player_index": 2, "seconds": 4.0, "frame_num": 240}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            SourceEvent::Spectate(SpectateChange {
                player_index: PlayerIndex(2),
                ..
            })
        ));

        let event = decode_event(
            EventKind::InputChange,
            br#"{"player_index": 1, "seconds": 4.5, "frame_num": 270, "controller_state": {
                "jump": true, "steer": -1.0, "throttle": 1.0, "pitch": 0.0, "yaw": 0.0,
                "roll": 0.0, "boost": false, "handbrake": false, "use_item": false}}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::InputChange);

        let event = decode_event(
            EventKind::WorldTick,
            br#"{"round_active": false, "players": []}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            SourceEvent::WorldTick(WorldTick {
                round_active: false,
                players: Vec::new(),
            })
        );

        let event = decode_event(
            EventKind::PlayerStat,
            br#"{"player_index": 0, "stat_type": "Goal", "seconds": 61.0, "frame_num": 3660}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::PlayerStat);
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = decode_event(EventKind::InputChange, br#"{"player_index": 1}"#).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed {
                kind: EventKind::InputChange,
                ..
            }
        ));
    }

    #[test]
    fn tick_without_players_is_malformed() {
        let err = decode_event(EventKind::WorldTick, br#"{"round_active": true}"#).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed {
                kind: EventKind::WorldTick,
                ..
            }
        ));
    }

    #[test]
    fn partial_controller_state_is_malformed() {
        let err = decode_event(
            EventKind::InputChange,
            br#"{"player_index": 0, "seconds": 1.0, "frame_num": 60, "controller_state": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed {
                kind: EventKind::InputChange,
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_event(EventKind::WorldTick, b"not json").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn memory_source_yields_only_registered_kinds() {
        let (mut source, handle) = MemorySource::new();
        source.register(EventKind::Spectate);

        handle.push(SourceEvent::WorldTick(WorldTick {
            round_active: true,
            players: Vec::new(),
        }));
        handle.push(SourceEvent::Spectate(SpectateChange {
            player_index: PlayerIndex(5),
            seconds: 0.0,
            frame_num: 0,
        }));
        drop(handle);

        let first = source.next_event().await.unwrap().unwrap();
        assert_eq!(first.kind(), EventKind::Spectate);
        assert!(source.next_event().await.is_none());
    }

    #[tokio::test]
    async fn memory_source_decodes_raw_payloads() {
        let (mut source, handle) = MemorySource::new();
        source.register(EventKind::WorldTick);

        handle.push_raw(EventKind::WorldTick, r#"{"players": []}"#);
        handle.push_raw(EventKind::WorldTick, r#"{"round_active": true, "players": []}"#);

        assert!(matches!(
            source.next_event().await,
            Some(Err(SourceError::Malformed { .. }))
        ));
        assert!(matches!(
            source.next_event().await,
            Some(Ok(SourceEvent::WorldTick(_)))
        ));
    }
}
