//! NATS-based event source for the bridge.
//!
//! [`NatsEventSource`] implements [`EventSource`] by subscribing to every
//! subject under the configured prefix and decoding each message
//! according to the subject's last token.
//!
//! # Subject Convention
//!
//! - `{prefix}.spectate` carries [`SpectateChange`] payloads
//! - `{prefix}.input` carries [`InputChange`] payloads
//! - `{prefix}.tick` carries [`WorldTick`] payloads
//! - `{prefix}.stat` carries [`PlayerStat`] payloads
//!
//! Messages on any other subject under the prefix are ignored.
//!
//! [`SpectateChange`]: overlay_types::SpectateChange
//! [`InputChange`]: overlay_types::InputChange
//! [`WorldTick`]: overlay_types::WorldTick
//! [`PlayerStat`]: overlay_types::PlayerStat

use std::collections::BTreeSet;
use std::time::Duration;

use futures::StreamExt as _;
use overlay_core::config::SourceConfig;
use overlay_core::source::{EventSource, SourceError, decode_event};
use overlay_types::{EventKind, SourceEvent};
use tracing::{debug, trace};

/// An event source that reads simulation events from NATS.
pub struct NatsEventSource {
    /// Kept so the connection lives as long as the subscription.
    _client: async_nats::Client,
    /// Subscription on `{prefix}.*`.
    subscriber: async_nats::Subscriber,
    /// Subject prefix without the trailing dot.
    prefix: String,
    /// Kinds the bridge asked for.
    registered: BTreeSet<EventKind>,
}

impl NatsEventSource {
    /// Connect to the NATS server and subscribe to the event subjects.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the server cannot be reached
    /// within the configured timeout or the subscription is refused.
    pub async fn connect(config: &SourceConfig) -> Result<Self, SourceError> {
        let url = &config.nats_url;
        let timeout = Duration::from_millis(config.connect_timeout_ms);

        let client = match tokio::time::timeout(timeout, async_nats::connect(url.as_str())).await
        {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                return Err(SourceError::Unavailable {
                    message: format!("failed to connect to NATS at {url}: {e}"),
                });
            }
            Err(_elapsed) => {
                return Err(SourceError::Unavailable {
                    message: format!(
                        "timed out after {}ms connecting to NATS at {url}",
                        config.connect_timeout_ms
                    ),
                });
            }
        };

        let subject = format!("{}.*", config.subject_prefix);
        let subscriber = client
            .subscribe(subject.clone())
            .await
            .map_err(|e| SourceError::Unavailable {
                message: format!("failed to subscribe to {subject}: {e}"),
            })?;
        debug!(%subject, "Subscribed to event subjects");

        Ok(Self {
            _client: client,
            subscriber,
            prefix: config.subject_prefix.clone(),
            registered: BTreeSet::new(),
        })
    }
}

impl EventSource for NatsEventSource {
    fn register(&mut self, kind: EventKind) {
        self.registered.insert(kind);
    }

    async fn next_event(&mut self) -> Option<Result<SourceEvent, SourceError>> {
        loop {
            let message = self.subscriber.next().await?;
            let subject = message.subject.as_str();
            let Some(kind) = kind_for_subject(&self.prefix, subject) else {
                trace!(subject, "Ignoring message on unknown subject");
                continue;
            };
            if !self.registered.contains(&kind) {
                trace!(%kind, "Ignoring unregistered event kind");
                continue;
            }
            return Some(decode_event(kind, &message.payload));
        }
    }
}

/// Map a NATS subject to the event kind it carries.
///
/// Returns `None` if the subject is outside the prefix or its last token
/// names no known kind.
fn kind_for_subject(prefix: &str, subject: &str) -> Option<EventKind> {
    let suffix = subject.strip_prefix(prefix)?.strip_prefix('.')?;
    EventKind::from_subject_suffix(suffix)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_for_subject_maps_every_kind() {
        for kind in EventKind::ALL {
            let subject = format!("overlay.{}", kind.subject_suffix());
            assert_eq!(kind_for_subject("overlay", &subject), Some(kind));
        }
    }

    #[test]
    fn kind_for_subject_rejects_foreign_subjects() {
        assert_eq!(kind_for_subject("overlay", "overlay.ball"), None);
        assert_eq!(kind_for_subject("overlay", "other.spectate"), None);
        assert_eq!(kind_for_subject("overlay", "overlayspectate"), None);
        assert_eq!(kind_for_subject("overlay", "overlay.spectate.extra"), None);
    }

    #[test]
    fn kind_for_subject_honors_dotted_prefix() {
        assert_eq!(
            kind_for_subject("arena.match1", "arena.match1.tick"),
            Some(EventKind::WorldTick)
        );
    }

    #[test]
    fn decoded_payload_matches_subject_kind() {
        let kind = kind_for_subject("overlay", "overlay.spectate").unwrap();
        let event = decode_event(kind, br#"{"player_index":1,"seconds":0.0,"frame_num":0}"#).unwrap();
        assert_eq!(event.kind(), EventKind::Spectate);
    }

    #[tokio::test]
    async fn connect_to_unreachable_server_is_unavailable() {
        let config = SourceConfig {
            nats_url: String::from("nats://127.0.0.1:1"),
            subject_prefix: String::from("overlay"),
            connect_timeout_ms: 500,
        };
        let result = NatsEventSource::connect(&config).await;
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }
}
