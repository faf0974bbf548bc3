//! `WebSocket` handler for observer connections.
//!
//! Each accepted socket becomes a [`QueuedChannel`] registered with the
//! bridge loop, which immediately replays the cached state to it. From
//! then on two tasks serve the socket:
//!
//! - a writer that drains the channel queue into text frames, in order
//! - a reader that logs inbound text and never answers it
//!
//! When either side finishes the other is aborted. That drops the queue
//! receiver, the channel reports closed, and the registry prunes it on
//! the next broadcast.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt as _, StreamExt as _};
use overlay_core::channel::{ObserverChannel as _, QueuedChannel};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to an observer `WebSocket`.
///
/// # Route
///
/// `GET /` and `GET /ws`
pub async fn ws_observe(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| warn!(error = %e, "Observer upgrade failed"))
        .on_upgrade(|socket| handle_ws(socket, state))
}

/// Run one observer connection from accept to close.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let (channel, mut queue) = QueuedChannel::new();
    let observer = channel.id();

    if let Err(e) = state.bridge.attach(channel) {
        warn!(%observer, error = %e, "Rejecting observer");
        let _ = socket.close().await;
        return;
    }
    debug!(%observer, "Observer accepted");

    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(payload) = queue.recv().await {
            let frame = Message::Text(payload.as_ref().into());
            if sink.send(frame).await.is_err() {
                debug!(%observer, "Observer send failed");
                return;
            }
        }
        // Queue ended: the bridge dropped this observer.
        let _ = sink.close().await;
    });

    let mut reader = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    info!(%observer, message = text.as_str(), "Observer message");
                }
                Ok(Message::Close(_)) => return,
                Ok(_) => {
                    // Binary, ping, and pong frames carry nothing for us.
                }
                Err(e) => {
                    debug!(%observer, error = %e, "Observer read error");
                    return;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    info!(%observer, "Observer disconnected");
}
