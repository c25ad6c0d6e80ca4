//! Regional heatmap view: year selection, server tables, local fallback.
//!
//! The view asks the server for a year's regional table. When the channel
//! is down, or the server reports an error for the year, it degrades to a
//! locally synthesized placeholder table so the map still renders.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::telemetry::{region_names, RegionLoad, AVAILABLE_YEARS};
use crate::protocol::{ClientRequest, ServerEvent};

use super::channel::{ClientChannel, ConnectionState};
use super::event::ChannelEvent;
use super::registry::Subscription;

/// Year the dashboard opens on.
pub const DEFAULT_YEAR: &str = "2024";

/// Fallback base consumption per year, used only for placeholder tables.
const PLACEHOLDER_BASE: &[(&str, i64)] = &[
    ("2020", 3000),
    ("2021", 3200),
    ("2022", 3500),
    ("2023", 3800),
    ("2024", 4000),
];

const PLACEHOLDER_DEFAULT_BASE: i64 = 3500;

/// Synthesizes a stand-in regional table for a year. Values are the
/// year's base plus jitter, so the map shows plausible variation instead
/// of a flat color.
pub fn placeholder_table(year: &str, rng: &mut impl Rng) -> Vec<RegionLoad> {
    let base = PLACEHOLDER_BASE
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, base)| *base)
        .unwrap_or(PLACEHOLDER_DEFAULT_BASE);
    region_names()
        .map(|name| RegionLoad {
            name: name.to_string(),
            value: base + rng.gen_range(0..=500),
        })
        .collect()
}

#[derive(Debug, Default)]
struct ViewState {
    selected_year: String,
    table: Vec<RegionLoad>,
    loading: bool,
    error: Option<String>,
    /// True when the table was synthesized locally rather than served.
    degraded: bool,
}

/// A heatmap bound to a channel.
pub struct HeatmapView {
    channel: ClientChannel,
    state: Arc<Mutex<ViewState>>,
    _subscriptions: Vec<Subscription>,
}

impl HeatmapView {
    /// Subscribes to the year-data events and requests the default year.
    pub fn attach(channel: &ClientChannel) -> Self {
        let state = Arc::new(Mutex::new(ViewState {
            selected_year: DEFAULT_YEAR.to_string(),
            loading: false,
            ..ViewState::default()
        }));

        let on_data = {
            let state = Arc::clone(&state);
            channel.on("year_data", move |event| {
                if let ChannelEvent::Message(ServerEvent::YearData { year, data }) = event {
                    let mut view = state.lock().expect("heatmap view lock poisoned");
                    // A slow reply for a year the user has already left
                    // must not clobber the current selection.
                    if *year == view.selected_year {
                        view.table = data.clone();
                        view.loading = false;
                        view.error = None;
                        view.degraded = false;
                    }
                }
            })
        };
        let on_error = {
            let state = Arc::clone(&state);
            channel.on("year_data_error", move |event| {
                if let ChannelEvent::Message(ServerEvent::YearDataError { message, .. }) = event {
                    let mut view = state.lock().expect("heatmap view lock poisoned");
                    tracing::warn!(error = %message, "year table unavailable, degrading");
                    view.loading = false;
                    view.error = Some(message.clone());
                    let year = view.selected_year.clone();
                    view.table = placeholder_table(&year, &mut StdRng::from_entropy());
                    view.degraded = true;
                }
            })
        };
        let on_connect_error = {
            let state = Arc::clone(&state);
            channel.on("connect_error", move |event| {
                if let ChannelEvent::ConnectError { message } = event {
                    let mut view = state.lock().expect("heatmap view lock poisoned");
                    view.loading = false;
                    view.error = Some(message.clone());
                    let year = view.selected_year.clone();
                    view.table = placeholder_table(&year, &mut StdRng::from_entropy());
                    view.degraded = true;
                }
            })
        };

        let view = Self {
            channel: channel.clone(),
            state,
            _subscriptions: vec![on_data, on_error, on_connect_error],
        };
        view.request_year(DEFAULT_YEAR);
        view
    }

    /// Switches the selected year. Re-selecting the current year is a
    /// no-op. Served when connected; synthesized locally otherwise.
    pub fn select_year(&self, year: &str) {
        {
            let view = self.state.lock().expect("heatmap view lock poisoned");
            if view.selected_year == year {
                return;
            }
        }
        self.request_year(year);
    }

    fn request_year(&self, year: &str) {
        let connected = self.channel.state() == ConnectionState::Connected;
        let mut view = self.state.lock().expect("heatmap view lock poisoned");
        view.selected_year = year.to_string();
        if connected {
            view.loading = true;
            drop(view);
            self.channel.emit(ClientRequest::RequestYearData {
                year: year.to_string(),
            });
        } else {
            tracing::warn!(year, "channel down, serving placeholder table");
            view.loading = false;
            view.table = placeholder_table(year, &mut StdRng::from_entropy());
            view.degraded = true;
        }
    }

    pub fn selected_year(&self) -> String {
        self.state
            .lock()
            .expect("heatmap view lock poisoned")
            .selected_year
            .clone()
    }

    pub fn table(&self) -> Vec<RegionLoad> {
        self.state
            .lock()
            .expect("heatmap view lock poisoned")
            .table
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().expect("heatmap view lock poisoned").loading
    }

    pub fn error(&self) -> Option<String> {
        self.state
            .lock()
            .expect("heatmap view lock poisoned")
            .error
            .clone()
    }

    /// True when the current table was synthesized locally.
    pub fn is_degraded(&self) -> bool {
        self.state.lock().expect("heatmap view lock poisoned").degraded
    }

    /// Sum over the current table, for the headline figure.
    pub fn total_load(&self) -> i64 {
        self.state
            .lock()
            .expect("heatmap view lock poisoned")
            .table
            .iter()
            .map(|r| r.value)
            .sum()
    }

    pub fn available_years(&self) -> &'static [&'static str] {
        &AVAILABLE_YEARS
    }
}
