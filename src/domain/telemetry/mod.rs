//! Telemetry value types: grid samples, renewable output, device fleet
//! status, regional tables and the network topology.

mod regions;
mod topology;
mod types;

pub use regions::{region_names, year_table, AVAILABLE_YEARS};
pub use topology::{NodeKind, Topology, TopologyLink, TopologyNode};
pub use types::{
    DeviceStatus, GridStatus, GridUpdate, InstalledCapacity, RegionLoad, RenewableUpdate,
};
