//! Unified error handling for Sensorloop
//!
//! This crate provides the single error type used by every Sensorloop task.
//! Each task handles its own errors at its boundary, so most variants are
//! reported and then dropped rather than propagated across threads.

use std::io;
use std::path::PathBuf;

/// Result type alias using SensorLoopError
pub type Result<T> = std::result::Result<T, SensorLoopError>;

/// Unified error type for all Sensorloop operations
#[derive(thiserror::Error, Debug)]
pub enum SensorLoopError {
    // ============================================================================
    // Registry Errors
    // ============================================================================
    #[error("Sensor '{name}' not found")]
    NotFound {
        name: String,
    },

    #[error("Duplicate sensor name: {0}")]
    DuplicateSensor(String),

    #[error("Failed to read sensor {sensor}: {reason}")]
    SensorRead {
        sensor: String,
        reason: String,
    },

    // ============================================================================
    // Operator Input Errors
    // ============================================================================
    #[error("Invalid input {input:?}: {reason}")]
    Parse {
        input: String,
        reason: String,
    },

    #[error("Command channel closed")]
    ChannelClosed,

    // ============================================================================
    // Log Sink Errors
    // ============================================================================
    #[error("Could not open log file {path}: {source}")]
    SinkUnavailable {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write log file {path}: {source}")]
    TransientWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SensorLoopError {
    /// Create a not-found error for a sensor name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a parse error for a line of operator input
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a sensor read error
    pub fn sensor_read(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SensorRead {
            sensor: sensor.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that end the task that raised them
    pub fn is_fatal_to_task(&self) -> bool {
        matches!(self, Self::SinkUnavailable { .. } | Self::ChannelClosed)
    }
}
