//! Error types for the bridge binary.

/// Top-level error for the bridge binary.
///
/// Each variant wraps a specific subsystem error so `main` can propagate
/// with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: overlay_core::config::ConfigError,
    },

    /// The upstream event source could not be reached.
    #[error("source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: overlay_core::source::SourceError,
    },

    /// The observer listener failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: overlay_observer::ServerError,
    },

    /// The bridge loop stopped with an error.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: overlay_core::runner::RunnerError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {message}")]
    Signal {
        /// Description of the failure.
        message: String,
    },
}
