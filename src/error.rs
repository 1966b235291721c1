//! Error types for the display controller.
//!
//! One enum per concern. None of these escape the worker loop: render and
//! telemetry failures are logged and the loop carries on at the next tick.

pub use oled_display_common::FrameError;

/// Failure to load the frame asset file.
#[derive(Debug, thiserror::Error)]
pub enum FrameStoreError {
    /// The file exists but could not be read.
    #[error("failed to read frame asset: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents are not a valid frame set.
    #[error("malformed frame asset: {0}")]
    Format(#[from] FrameError),
}

/// Failure reported by the panel transport (I2C, SPI, simulator window).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("panel transport error: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The message passed at construction.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure to construct a renderer.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// The transport refused to initialise the panel.
    #[error("panel initialisation failed: {0}")]
    Transport(#[from] TransportError),

    /// No panel is attached.
    #[error("display hardware unavailable: {0}")]
    Unavailable(String),
}

/// Failure to sample a metric from the telemetry source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// The metric cannot be read on this system.
    #[error("metric unavailable: {0}")]
    Unavailable(&'static str),

    /// A named disk or interface does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// `disk` or `interface`.
        kind: &'static str,
        /// The requested name.
        name: String,
    },
}

/// A rejected configuration value. The previous value stays in effect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The value has the right type but is outside the allowed domain.
    #[error("invalid value {value} for {key} (expected {expected})")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// The rejected value, rendered as TOML.
        value: String,
        /// Description of the allowed domain.
        expected: &'static str,
    },

    /// The value has the wrong TOML type.
    #[error("wrong type for {key} (expected {expected})")]
    WrongType {
        /// Configuration key.
        key: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// The configuration text is not valid TOML.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure to start the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn display worker: {0}")]
    Spawn(#[from] std::io::Error),
}
