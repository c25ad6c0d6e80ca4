//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `GRIDPULSE` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use gridpulse::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod channel;
mod error;
mod server;
mod telemetry;

pub use channel::ChannelConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, environment, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Telemetry generator and ledger configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Client channel configuration (endpoint, reconnection backoffs)
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then environment variables with the
    /// `GRIDPULSE` prefix:
    ///
    /// - `GRIDPULSE__SERVER__PORT=8081` -> `server.port = 8081`
    /// - `GRIDPULSE__TELEMETRY__ALARM_THRESHOLD=4500`
    /// - `GRIDPULSE__CHANNEL__ENDPOINT=ws://localhost:8081/live`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GRIDPULSE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.telemetry.validate()?;
        self.channel.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("GRIDPULSE__SERVER__PORT");
        env::remove_var("GRIDPULSE__SERVER__ENVIRONMENT");
        env::remove_var("GRIDPULSE__TELEMETRY__ALARM_THRESHOLD");
        env::remove_var("GRIDPULSE__CHANNEL__ENDPOINT");
    }

    #[test]
    fn test_load_with_no_env_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.telemetry.alarm_threshold, 4500);
        assert_eq!(config.channel.endpoint, "ws://localhost:8081/live");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GRIDPULSE__SERVER__PORT", "9000");
        env::set_var("GRIDPULSE__TELEMETRY__ALARM_THRESHOLD", "4000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.telemetry.alarm_threshold, 4000);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GRIDPULSE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }
}
