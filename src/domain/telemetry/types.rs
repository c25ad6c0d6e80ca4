//! Telemetry payload types pushed to dashboards.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Overall grid health reported with each load sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStatus {
    Normal,
    Fault,
}

/// One grid load sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridUpdate {
    pub timestamp: Timestamp,
    /// Instantaneous load in MW.
    pub load: u32,
    pub status: GridStatus,
}

/// Installed generation capacity per renewable source, in MW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledCapacity {
    pub solar: u32,
    pub wind: u32,
    pub hydro: u32,
    pub biomass: u32,
}

/// Current renewable generation, in MW, with capacities for gauge scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenewableUpdate {
    pub solar: u32,
    pub wind: u32,
    pub hydro: u32,
    pub biomass: u32,
    pub capacity: InstalledCapacity,
}

/// Device fleet connectivity summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub online: u32,
    /// Online share in percent, one decimal of precision.
    pub rate: f64,
}

/// Annual consumption of one region, for the regional heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLoad {
    pub name: String,
    /// Consumption in GWh.
    pub value: i64,
}
