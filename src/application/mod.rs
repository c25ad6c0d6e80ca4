//! Application services: request routing and the telemetry feeds.

mod router;
mod simulator;

pub use router::{EventRouter, RouterReply};
pub use simulator::{
    alarm_for_sample, online_rate, sample_grid, sample_renewables, solar_output, step_devices,
    RenewableBase, Simulator, INSTALLED_CAPACITY,
};
