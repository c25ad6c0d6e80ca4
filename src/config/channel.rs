//! Client channel configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Endpoint and reconnection policy for the dashboard-side channel.
///
/// Backoff delays are fixed, not exponential: a failed handshake retries
/// after `connect_backoff_ms`, an unexpected mid-session disconnect after
/// the shorter `resume_backoff_ms`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// WebSocket endpoint of the telemetry server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Delay in milliseconds before retrying after a failed connection
    /// attempt
    #[serde(default = "default_connect_backoff")]
    pub connect_backoff_ms: u64,

    /// Delay in milliseconds before reconnecting after an unexpected
    /// disconnect
    #[serde(default = "default_resume_backoff")]
    pub resume_backoff_ms: u64,
}

impl ChannelConfig {
    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }

    pub fn resume_backoff(&self) -> Duration {
        Duration::from_millis(self.resume_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            return Err(ValidationError::InvalidEndpoint);
        }
        if self.connect_backoff_ms == 0 {
            return Err(ValidationError::InvalidBackoff("connect_backoff_ms"));
        }
        if self.resume_backoff_ms == 0 {
            return Err(ValidationError::InvalidBackoff("resume_backoff_ms"));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_backoff_ms: default_connect_backoff(),
            resume_backoff_ms: default_resume_backoff(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:8081/live".to_string()
}

fn default_connect_backoff() -> u64 {
    5_000
}

fn default_resume_backoff() -> u64 {
    3_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChannelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_backoff(), Duration::from_secs(5));
        assert_eq!(config.resume_backoff(), Duration::from_secs(3));
    }

    #[test]
    fn test_http_endpoint_rejected() {
        let config = ChannelConfig {
            endpoint: "http://localhost:8081/live".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wss_endpoint_accepted() {
        let config = ChannelConfig {
            endpoint: "wss://grid.example.com/live".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_backoff_rejected() {
        let config = ChannelConfig {
            resume_backoff_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
