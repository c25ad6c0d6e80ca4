//! Telemetry simulation and ledger configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Tick rates, alarm policy and fleet size for the telemetry generators.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Seconds between grid load samples
    #[serde(default = "default_grid_interval")]
    pub grid_interval_secs: u64,

    /// Seconds between renewable generation samples
    #[serde(default = "default_renewable_interval")]
    pub renewable_interval_secs: u64,

    /// Seconds between device fleet samples
    #[serde(default = "default_device_interval")]
    pub device_interval_secs: u64,

    /// Load in MW above which a load_exceed alarm fires
    #[serde(default = "default_alarm_threshold")]
    pub alarm_threshold: u32,

    /// Records the alarm ledger retains before evicting the oldest
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,

    /// Size of the simulated device fleet
    #[serde(default = "default_device_count")]
    pub device_count: u32,

    /// Buffer size of the per-process broadcast channel. Slow clients
    /// that fall further behind than this miss updates.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl TelemetryConfig {
    pub fn grid_interval(&self) -> Duration {
        Duration::from_secs(self.grid_interval_secs)
    }

    pub fn renewable_interval(&self) -> Duration {
        Duration::from_secs(self.renewable_interval_secs)
    }

    pub fn device_interval(&self) -> Duration {
        Duration::from_secs(self.device_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.grid_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("grid_interval_secs"));
        }
        if self.renewable_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("renewable_interval_secs"));
        }
        if self.device_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("device_interval_secs"));
        }
        if self.ledger_capacity == 0 {
            return Err(ValidationError::InvalidLedgerCapacity);
        }
        if self.alarm_threshold == 0 {
            return Err(ValidationError::InvalidAlarmThreshold);
        }
        if self.device_count == 0 {
            return Err(ValidationError::InvalidDeviceCount);
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            grid_interval_secs: default_grid_interval(),
            renewable_interval_secs: default_renewable_interval(),
            device_interval_secs: default_device_interval(),
            alarm_threshold: default_alarm_threshold(),
            ledger_capacity: default_ledger_capacity(),
            device_count: default_device_count(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_grid_interval() -> u64 {
    2
}

fn default_renewable_interval() -> u64 {
    10
}

fn default_device_interval() -> u64 {
    10
}

fn default_alarm_threshold() -> u32 {
    4500
}

fn default_ledger_capacity() -> usize {
    100
}

fn default_device_count() -> u32 {
    1500
}

fn default_broadcast_capacity() -> usize {
    128
}
