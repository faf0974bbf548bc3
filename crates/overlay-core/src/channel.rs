//! Observer channel abstraction.
//!
//! An [`ObserverChannel`] is one push-capable connection to a downstream
//! observer. The bridge only needs three things from it: an identity, a
//! liveness check, and a send that never blocks the caller.
//!
//! [`QueuedChannel`] is the transport-agnostic implementation: sends go
//! into an unbounded FIFO queue, and whoever owns the receiving half
//! (a `WebSocket` writer task, a test) drains it. Dropping the receiver
//! closes the channel.

use std::sync::Arc;

use overlay_types::ObserverId;
use tokio::sync::mpsc;

/// One serialized outbound message, shared across every channel it is
/// delivered to.
pub type Payload = Arc<str>;

/// Errors from a single channel send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The observer side of the channel is gone.
    #[error("observer {observer} channel is closed")]
    Closed {
        /// The observer whose channel is closed.
        observer: ObserverId,
    },
}

/// A downstream connection that accepts text payloads.
pub trait ObserverChannel: Send {
    /// Stable identity of this connection.
    fn id(&self) -> ObserverId;

    /// Whether the connection can still accept messages.
    fn is_open(&self) -> bool;

    /// Queue a payload for delivery without waiting for it to be written.
    ///
    /// Payloads sent through one channel are delivered in send order.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] if the connection has gone away.
    fn send(&self, payload: Payload) -> Result<(), ChannelError>;
}

impl<T: ObserverChannel + ?Sized> ObserverChannel for Box<T> {
    fn id(&self) -> ObserverId {
        (**self).id()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send(&self, payload: Payload) -> Result<(), ChannelError> {
        (**self).send(payload)
    }
}

/// Queue-backed observer channel.
#[derive(Debug, Clone)]
pub struct QueuedChannel {
    id: ObserverId,
    tx: mpsc::UnboundedSender<Payload>,
}

impl QueuedChannel {
    /// Create a channel with a fresh [`ObserverId`] and return it with the
    /// receiving half of its queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Payload>) {
        Self::with_id(ObserverId::new())
    }

    /// Create a channel with a caller-chosen identity.
    pub fn with_id(id: ObserverId) -> (Self, mpsc::UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }
}

impl ObserverChannel for QueuedChannel {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, payload: Payload) -> Result<(), ChannelError> {
        self.tx
            .send(payload)
            .map_err(|_closed| ChannelError::Closed { observer: self.id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_send_order() {
        let (channel, mut rx) = QueuedChannel::new();
        channel.send(Payload::from("first")).unwrap();
        channel.send(Payload::from("second")).unwrap();

        assert_eq!(rx.try_recv().unwrap().as_ref(), "first");
        assert_eq!(rx.try_recv().unwrap().as_ref(), "second");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_receiver_closes_channel() {
        let (channel, rx) = QueuedChannel::new();
        assert!(channel.is_open());

        drop(rx);
        assert!(!channel.is_open());
        assert_eq!(
            channel.send(Payload::from("late")),
            Err(ChannelError::Closed {
                observer: channel.id()
            })
        );
    }

    #[test]
    fn clones_share_identity_and_queue() {
        let (channel, mut rx) = QueuedChannel::new();
        let copy = channel.clone();
        assert_eq!(copy.id(), channel.id());

        copy.send(Payload::from("via clone")).unwrap();
        assert_eq!(rx.try_recv().unwrap().as_ref(), "via clone");
    }
}
