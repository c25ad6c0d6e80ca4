//! Domain layer: alarm state and telemetry value types.

pub mod alarm;
pub mod foundation;
pub mod telemetry;
