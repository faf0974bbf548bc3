//! The bridge loop: one task, one thing at a time.
//!
//! [`run_bridge`] multiplexes the upstream [`EventSource`] with commands
//! from the observer listener ([`BridgeCommand`]). Each event or command
//! runs to completion before the next one is polled, which serializes
//! every cache and registry mutation without a lock. Listener tasks talk
//! to the loop through a cloneable [`BridgeHandle`].

use overlay_types::BridgeStatus;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::bridge::EventBridge;
use crate::channel::ObserverChannel;
use crate::source::{EventSource, SourceError};

/// Requests from outside the loop.
#[derive(Debug)]
pub enum BridgeCommand<C> {
    /// A new observer connection was accepted.
    Attach(C),
    /// Report the current bridge status.
    Status(oneshot::Sender<BridgeStatus>),
}

/// Errors returned to [`BridgeHandle`] callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The bridge loop is no longer running.
    #[error("bridge loop has stopped")]
    Stopped,
}

/// Errors that end the bridge loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The event source became unavailable.
    #[error("source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },
}

/// Why the loop returned normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEnd {
    /// The event source reported end of stream.
    SourceClosed,
}

/// Cloneable sender side of the command queue.
#[derive(Debug)]
pub struct BridgeHandle<C> {
    tx: mpsc::UnboundedSender<BridgeCommand<C>>,
}

impl<C> Clone for BridgeHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Receiver side of the command queue, consumed by [`run_bridge`].
pub type BridgeCommands<C> = mpsc::UnboundedReceiver<BridgeCommand<C>>;

/// Create a connected handle and command receiver.
pub fn bridge_channel<C>() -> (BridgeHandle<C>, BridgeCommands<C>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeHandle { tx }, rx)
}

impl<C> BridgeHandle<C> {
    /// Hand a newly accepted observer to the bridge.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stopped`] if the loop is gone; the channel
    /// is dropped.
    pub fn attach(&self, channel: C) -> Result<(), BridgeError> {
        self.tx
            .send(BridgeCommand::Attach(channel))
            .map_err(|_rejected| BridgeError::Stopped)
    }

    /// Ask the loop for its current status.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stopped`] if the loop is gone.
    pub async fn status(&self) -> Result<BridgeStatus, BridgeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BridgeCommand::Status(reply_tx))
            .map_err(|_rejected| BridgeError::Stopped)?;
        reply_rx.await.map_err(|_dropped| BridgeError::Stopped)
    }

    /// Whether the loop is still receiving commands.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Drive `bridge` from `source` and `commands` until the source ends.
///
/// Malformed events and transient transport errors are logged and
/// skipped. Once every [`BridgeHandle`] is dropped the loop keeps
/// serving upstream events.
///
/// # Errors
///
/// Returns [`RunnerError::Source`] if the source reports itself
/// unavailable.
pub async fn run_bridge<C, S>(
    bridge: &mut EventBridge<C>,
    source: &mut S,
    mut commands: BridgeCommands<C>,
) -> Result<BridgeEnd, RunnerError>
where
    C: ObserverChannel,
    S: EventSource,
{
    let mut commands_open = true;
    info!("Bridge loop starting");

    loop {
        tokio::select! {
            next = source.next_event() => match next {
                None => {
                    info!("Event source closed");
                    return Ok(BridgeEnd::SourceClosed);
                }
                Some(Ok(event)) => {
                    bridge.dispatch(&event);
                }
                Some(Err(SourceError::Malformed { kind, message })) => {
                    warn!(%kind, error = %message, "Dropping malformed event");
                }
                Some(Err(SourceError::Transport { message })) => {
                    warn!(error = %message, "Event source transport error");
                }
                Some(Err(e @ SourceError::Unavailable { .. })) => {
                    error!(error = %e, "Event source unavailable");
                    return Err(e.into());
                }
            },
            command = commands.recv(), if commands_open => match command {
                Some(BridgeCommand::Attach(channel)) => {
                    bridge.accept(channel);
                }
                Some(BridgeCommand::Status(reply)) => {
                    // The requester may have given up; nothing to do then.
                    let _ = reply.send(bridge.status());
                }
                None => {
                    debug!("All bridge handles dropped");
                    commands_open = false;
                }
            },
        }
    }
}
