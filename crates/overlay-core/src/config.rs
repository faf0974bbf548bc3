//! Configuration loading and typed config structures for the overlay
//! bridge.
//!
//! The configuration lives in `overlay-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields a working loopback setup on port 8765.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration.
///
/// Mirrors the structure of `overlay-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OverlayConfig {
    /// Observer listener settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Upstream event source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OverlayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `NATS_URL` overrides `source.nats_url`
    /// - `OBSERVER_HOST` overrides `observer.host`
    /// - `OBSERVER_PORT` overrides `observer.port` (ignored if not a valid port)
    /// - `LOG_FORMAT` overrides `logging.format`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from a YAML string without environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("NATS_URL") {
            self.source.nats_url = val;
        }
        if let Some(val) = lookup("OBSERVER_HOST") {
            self.observer.host = val;
        }
        if let Some(port) = lookup("OBSERVER_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.observer.port = port;
        }
        if let Some(val) = lookup("LOG_FORMAT") {
            match val.as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "pretty" => self.logging.format = LogFormat::Pretty,
                _ => {}
            }
        }
    }
}

/// Observer listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Upstream event source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Subject prefix; events arrive on `{prefix}.{kind}`.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// How long to wait for the initial connection before giving up.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            subject_prefix: default_subject_prefix(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Output format for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_observer_host() -> String {
    String::from("127.0.0.1")
}

const fn default_observer_port() -> u16 {
    8765
}

fn default_nats_url() -> String {
    String::from("nats://localhost:4222")
}

fn default_subject_prefix() -> String {
    String::from("overlay")
}

const fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    String::from("info")
}
