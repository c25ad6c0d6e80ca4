//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Tick interval '{0}' must be at least one second")]
    InvalidInterval(&'static str),

    #[error("Alarm ledger capacity must be greater than zero")]
    InvalidLedgerCapacity,

    #[error("Alarm threshold must be greater than zero")]
    InvalidAlarmThreshold,

    #[error("Device count must be greater than zero")]
    InvalidDeviceCount,

    #[error("Channel endpoint must be a ws:// or wss:// URL")]
    InvalidEndpoint,

    #[error("Backoff delay '{0}' must be greater than zero")]
    InvalidBackoff(&'static str),
}
