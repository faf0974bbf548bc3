//! Bridge binary for the spectate overlay.
//!
//! Wires the NATS event source, the bridge loop, and the observer
//! listener together, then relays simulation events to connected
//! overlay clients until the source ends or the process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `overlay-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to NATS and subscribe to the event subjects
//! 4. Register the bridge's handlers with the source
//! 5. Start the observer listener
//! 6. Run the bridge loop until the source ends or Ctrl-C
//! 7. Log the result

mod error;
mod nats_source;

use std::path::Path;
use std::sync::Arc;

use overlay_core::bridge::{EventBridge, register_handlers};
use overlay_core::channel::QueuedChannel;
use overlay_core::config::{LogFormat, LoggingConfig, OverlayConfig};
use overlay_core::runner::{BridgeEnd, bridge_channel, run_bridge};
use overlay_observer::ServerConfig;
use overlay_observer::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::nats_source::NatsEventSource;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "overlay-config.yaml";

/// Application entry point for the bridge.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the event source
/// is unreachable, or the observer listener cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_FILE);
    let config = load_config(config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("overlay-engine starting");
    info!(
        config_file = CONFIG_FILE,
        found = config_path.exists(),
        nats_url = config.source.nats_url,
        subject_prefix = config.source.subject_prefix,
        observer_host = config.observer.host,
        observer_port = config.observer.port,
        "Configuration loaded"
    );

    // 3. Connect to the event source.
    info!(
        nats_url = config.source.nats_url,
        timeout_ms = config.source.connect_timeout_ms,
        "Connecting to NATS"
    );
    let mut source = match NatsEventSource::connect(&config.source).await {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Event source unavailable, exiting");
            return Err(EngineError::from(e).into());
        }
    };
    info!("NATS event source connected");

    // 4. Register the bridge with the source.
    register_handlers(&mut source);
    let mut bridge = EventBridge::<QueuedChannel>::new();

    // 5. Start the observer listener.
    let (handle, commands) = bridge_channel();
    let server_config = ServerConfig {
        host: config.observer.host.clone(),
        port: config.observer.port,
    };
    let app_state = Arc::new(AppState::new(handle));
    let observer = overlay_observer::spawn_observer(&server_config, app_state)
        .await
        .map_err(EngineError::from)?;
    info!(addr = %observer.local_addr, "Observer listener started");

    // 6. Run the bridge loop.
    let outcome = tokio::select! {
        result = run_bridge(&mut bridge, &mut source, commands) => Some(result),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| EngineError::Signal {
                message: format!("failed to listen for Ctrl-C: {e}"),
            })?;
            None
        }
    };

    // 7. Log the result.
    let status = bridge.status();
    match outcome {
        Some(Ok(BridgeEnd::SourceClosed)) => {
            info!(
                events_processed = status.events_processed,
                "Event source closed, overlay-engine shutdown complete"
            );
        }
        Some(Err(e)) => {
            error!(
                error = %e,
                events_processed = status.events_processed,
                "Bridge loop failed"
            );
            return Err(EngineError::from(e).into());
        }
        None => {
            info!(
                events_processed = status.events_processed,
                observers = status.observers,
                "Interrupted, overlay-engine shutdown complete"
            );
        }
    }

    observer.handle.abort();
    Ok(())
}

/// Load the bridge configuration.
///
/// Reads `path` if it exists; otherwise starts from defaults. Environment
/// overrides apply in both cases.
fn load_config(path: &Path) -> Result<OverlayConfig, EngineError> {
    if path.exists() {
        Ok(OverlayConfig::from_file(path)?)
    } else {
        let mut config = OverlayConfig::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
