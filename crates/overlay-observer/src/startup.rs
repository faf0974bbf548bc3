//! Observer server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_observer`], which binds the listener and then serves
//! it on a background Tokio task so the bridge loop can run on the
//! caller's task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// A running observer server.
#[derive(Debug)]
pub struct ObserverServer {
    /// The address actually bound (useful when the configured port is 0).
    pub local_addr: SocketAddr,
    /// Handle of the serving task.
    pub handle: JoinHandle<()>,
}

/// Bind the observer listener and serve it on a background task.
///
/// The bind happens before this function returns, so a port already in
/// use is reported to the caller instead of surfacing later in the
/// background task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or cannot be
/// bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverServer, ServerError> {
    let listener = config.bind().await?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%local_addr, "Observer server spawned on background task");

    Ok(ObserverServer { local_addr, handle })
}
