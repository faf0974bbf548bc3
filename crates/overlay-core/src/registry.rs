//! The set of live observer channels.
//!
//! Channels are added once when a connection is accepted and removed
//! lazily: a closed channel stays registered until the next
//! [`broadcast`](ConnectionRegistry::broadcast), which compacts it away
//! before sending. That prune is the only place channels leave the set.

use overlay_types::ObserverId;
use tracing::debug;

use crate::channel::{ChannelError, ObserverChannel, Payload};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Channels the payload was queued on.
    pub delivered: usize,
    /// Channels that were live at prune time but refused the send.
    pub failed: usize,
    /// Closed channels removed before sending.
    pub pruned: usize,
}

/// Live observer channels, unique by [`ObserverId`].
#[derive(Debug)]
pub struct ConnectionRegistry<C> {
    channels: Vec<C>,
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ConnectionRegistry<C> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Number of registered channels, including any closed ones not yet
    /// pruned.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channels are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<C: ObserverChannel> ConnectionRegistry<C> {
    /// Register a newly accepted channel.
    ///
    /// Returns `false` (and drops `channel`) if a channel with the same
    /// identity is already registered.
    pub fn add(&mut self, channel: C) -> bool {
        let id = channel.id();
        if self.contains(id) {
            debug!(observer = %id, "Observer already registered");
            return false;
        }
        self.channels.push(channel);
        true
    }

    /// Whether a channel with this identity is registered.
    pub fn contains(&self, id: ObserverId) -> bool {
        self.channels.iter().any(|c| c.id() == id)
    }

    /// Prune closed channels, then queue `payload` on every remaining one.
    ///
    /// A failed send on one channel never affects the others and is not
    /// reported to the caller beyond the counts in the returned report.
    pub fn broadcast(&mut self, payload: &Payload) -> BroadcastReport {
        let before = self.channels.len();
        self.channels.retain(|c| c.is_open());
        let pruned = before.saturating_sub(self.channels.len());
        if pruned > 0 {
            debug!(pruned, remaining = self.channels.len(), "Pruned closed observers");
        }

        let mut report = BroadcastReport {
            pruned,
            ..BroadcastReport::default()
        };
        for channel in &self.channels {
            match channel.send(Payload::clone(payload)) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(e) => {
                    debug!(error = %e, "Observer send failed");
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }
        report
    }

    /// Queue `payload` on one channel only, bypassing the broadcast path.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] if the channel is not registered
    /// or refuses the send.
    pub fn send_to(&self, id: ObserverId, payload: Payload) -> Result<(), ChannelError> {
        self.channels
            .iter()
            .find(|c| c.id() == id)
            .ok_or(ChannelError::Closed { observer: id })?
            .send(payload)
    }
}
