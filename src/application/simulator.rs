//! Telemetry simulator: the three periodic feeds behind the dashboard.
//!
//! Grid samples every couple of seconds with threshold and fault alarms,
//! renewable output on a slow cadence with a day-curve for solar, and the
//! device fleet drifting up and down. Each feed runs on its own task and
//! publishes through the shared broadcast channel.

use std::sync::Arc;

use chrono::{Local, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::TelemetryConfig;
use crate::domain::alarm::{AlarmKind, Severity};
use crate::domain::foundation::Timestamp;
use crate::domain::telemetry::{
    DeviceStatus, GridStatus, GridUpdate, InstalledCapacity, RenewableUpdate,
};
use crate::protocol::ServerEvent;

use super::router::EventRouter;

/// Probability that a grid sample reports a fault.
const FAULT_PROBABILITY: f64 = 0.1;

/// Grid load sample range in MW.
const LOAD_MIN: u32 = 2000;
const LOAD_MAX: u32 = 5000;

/// Installed capacity of the renewable park, in MW.
pub const INSTALLED_CAPACITY: InstalledCapacity = InstalledCapacity {
    solar: 200,
    wind: 350,
    hydro: 180,
    biomass: 60,
};

/// Alarm condition derived from one grid sample, threshold first.
pub fn alarm_for_sample(
    update: &GridUpdate,
    threshold: u32,
) -> Option<(AlarmKind, String, Severity)> {
    if update.load > threshold {
        Some((
            AlarmKind::LoadExceed,
            format!(
                "load {} MW exceeds threshold {} MW",
                update.load, threshold
            ),
            Severity::High,
        ))
    } else if update.status == GridStatus::Fault {
        Some((
            AlarmKind::SystemFault,
            "abnormal system status".to_string(),
            Severity::Critical,
        ))
    } else {
        None
    }
}

/// Draws one grid sample.
pub fn sample_grid(rng: &mut impl Rng) -> GridUpdate {
    GridUpdate {
        timestamp: Timestamp::now(),
        load: rng.gen_range(LOAD_MIN..LOAD_MAX),
        status: if rng.gen_bool(FAULT_PROBABILITY) {
            GridStatus::Fault
        } else {
            GridStatus::Normal
        },
    }
}

/// Slowly drifting base output the renewable curves modulate.
#[derive(Debug, Clone)]
pub struct RenewableBase {
    pub solar: f64,
    pub wind: f64,
    pub hydro: f64,
    pub biomass: f64,
}

impl Default for RenewableBase {
    fn default() -> Self {
        Self {
            solar: 125.0,
            wind: 280.0,
            hydro: 150.0,
            biomass: 45.0,
        }
    }
}

impl RenewableBase {
    /// Occasionally nudges solar and wind, modelling seasonal change.
    /// Bases stay within a floor and 95% of installed capacity.
    pub fn drift(&mut self, rng: &mut impl Rng) {
        if rng.gen_bool(0.05) {
            self.solar += if rng.gen_bool(0.5) { 0.5 } else { -0.5 };
            self.wind += if rng.gen_bool(0.5) { 0.3 } else { -0.3 };
            self.solar = self
                .solar
                .clamp(20.0, f64::from(INSTALLED_CAPACITY.solar) * 0.95);
            self.wind = self
                .wind
                .clamp(30.0, f64::from(INSTALLED_CAPACITY.wind) * 0.95);
        }
    }
}

/// Solar output for an hour of day: ramps from 06:00, peaks at noon,
/// fades by 18:00, with a small storage trickle overnight.
pub fn solar_output(base: f64, hour: u32) -> u32 {
    let output = if (6..=18).contains(&hour) {
        let distance_from_peak = (hour as f64 - 12.0).abs();
        let efficiency = (1.0 - distance_from_peak / 6.0).max(0.2);
        base * efficiency
    } else {
        base * 0.05
    };
    output.round() as u32
}

fn fluctuate(base: f64, spread: f64, rng: &mut impl Rng) -> u32 {
    let variation = rng.gen_range(-spread..spread);
    (base * (1.0 + variation)).round().max(0.0) as u32
}

/// Draws one renewable sample from the current bases.
pub fn sample_renewables(base: &RenewableBase, hour: u32, rng: &mut impl Rng) -> RenewableUpdate {
    RenewableUpdate {
        solar: solar_output(base.solar, hour),
        wind: fluctuate(base.wind, 0.15, rng),
        hydro: fluctuate(base.hydro, 0.05, rng),
        biomass: fluctuate(base.biomass, 0.02, rng),
        capacity: INSTALLED_CAPACITY,
    }
}

/// Advances the online-device count by one step: a random batch of up to
/// 14 devices joins or leaves, with a bias toward joining.
pub fn step_devices(online: u32, fleet: u32, rng: &mut impl Rng) -> u32 {
    let change = rng.gen_range(0..15);
    if rng.gen_bool(0.6) {
        online.saturating_add(change).min(fleet)
    } else {
        online.saturating_sub(change)
    }
}

/// Online rate as a percentage with one decimal, matching the wire shape.
pub fn online_rate(online: u32, fleet: u32) -> f64 {
    if fleet == 0 {
        return 0.0;
    }
    (f64::from(online) / f64::from(fleet) * 1000.0).round() / 10.0
}

pub struct Simulator {
    router: Arc<EventRouter>,
    events: broadcast::Sender<ServerEvent>,
    config: TelemetryConfig,
}

impl Simulator {
    pub fn new(
        router: Arc<EventRouter>,
        events: broadcast::Sender<ServerEvent>,
        config: TelemetryConfig,
    ) -> Self {
        Self {
            router,
            events,
            config,
        }
    }

    /// Spawns the three feed tasks. They run until the process exits.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let grid = tokio::spawn(Self::grid_loop(
            Arc::clone(&self.router),
            self.events.clone(),
            self.config.clone(),
        ));
        let renewable = tokio::spawn(Self::renewable_loop(
            self.events.clone(),
            self.config.clone(),
        ));
        let devices = tokio::spawn(Self::device_loop(self.events, self.config));
        vec![grid, renewable, devices]
    }

    async fn grid_loop(
        router: Arc<EventRouter>,
        events: broadcast::Sender<ServerEvent>,
        config: TelemetryConfig,
    ) {
        let mut rng = StdRng::from_entropy();
        let mut ticks = tokio::time::interval(config.grid_interval());
        loop {
            ticks.tick().await;
            let update = sample_grid(&mut rng);
            tracing::debug!(load = update.load, status = ?update.status, "grid sample");
            let alarm = alarm_for_sample(&update, config.alarm_threshold);
            let _ = events.send(ServerEvent::Update(update));

            if let Some((kind, message, severity)) = alarm {
                let record = router.raise_alarm(kind, message, severity).await;
                let _ = events.send(ServerEvent::Alarm(record));
            }
        }
    }

    async fn renewable_loop(events: broadcast::Sender<ServerEvent>, config: TelemetryConfig) {
        let mut rng = StdRng::from_entropy();
        let mut base = RenewableBase::default();
        let mut ticks = tokio::time::interval(config.renewable_interval());
        loop {
            ticks.tick().await;
            base.drift(&mut rng);
            let hour = Local::now().hour();
            let update = sample_renewables(&base, hour, &mut rng);
            let _ = events.send(ServerEvent::RenewableUpdate(update));
        }
    }

    async fn device_loop(events: broadcast::Sender<ServerEvent>, config: TelemetryConfig) {
        let mut rng = StdRng::from_entropy();
        let fleet = config.device_count;
        // The fleet starts nearly fully online.
        let mut online = (f64::from(fleet) * 0.97).floor() as u32;
        let mut ticks = tokio::time::interval(config.device_interval());
        loop {
            ticks.tick().await;
            online = step_devices(online, fleet, &mut rng);
            let _ = events.send(ServerEvent::DeviceStatus(DeviceStatus {
                online,
                rate: online_rate(online, fleet),
            }));
        }
    }
}
