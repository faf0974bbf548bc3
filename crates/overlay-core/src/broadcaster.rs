//! Serialize-once fan-out on top of the [`ConnectionRegistry`].

use overlay_types::OutboundMessage;
use tracing::{debug, warn};

use crate::channel::{ObserverChannel, Payload};
use crate::registry::{BroadcastReport, ConnectionRegistry};

/// Serialize an outbound message to its shared wire payload.
///
/// # Errors
///
/// Returns the `serde_json` error if the message cannot be encoded.
pub fn encode(message: &OutboundMessage) -> Result<Payload, serde_json::Error> {
    serde_json::to_string(message).map(Payload::from)
}

/// Owns the registry and delivers messages to it.
#[derive(Debug)]
pub struct Broadcaster<C> {
    registry: ConnectionRegistry<C>,
}

impl<C> Default for Broadcaster<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Broadcaster<C> {
    /// Create a broadcaster with an empty registry.
    pub const fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    /// Number of registered observers (closed ones are counted until the
    /// next broadcast prunes them).
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }
}

impl<C: ObserverChannel> Broadcaster<C> {
    /// Encode `message` once and deliver it to every live observer.
    ///
    /// Returns `None` if the message could not be encoded, in which case
    /// nothing was sent.
    pub fn publish(&mut self, message: &OutboundMessage) -> Option<BroadcastReport> {
        let payload = match encode(message) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize outbound message");
                return None;
            }
        };
        let report = self.registry.broadcast(&payload);
        debug!(
            delivered = report.delivered,
            failed = report.failed,
            pruned = report.pruned,
            "Broadcast sent"
        );
        Some(report)
    }

    /// Register `channel` and send it `replay`, in order, before anything
    /// else can reach it.
    ///
    /// Returns `false` without replaying if the channel was already
    /// registered.
    pub fn attach(&mut self, channel: C, replay: &[OutboundMessage]) -> bool {
        let id = channel.id();
        if !self.registry.add(channel) {
            return false;
        }
        for message in replay {
            let sent = encode(message)
                .map_err(|e| e.to_string())
                .and_then(|payload| {
                    self.registry
                        .send_to(id, payload)
                        .map_err(|e| e.to_string())
                });
            if let Err(error) = sent {
                debug!(observer = %id, error = %error, "Replay send failed");
                break;
            }
        }
        true
    }
}
