//! Rolling window of recent grid load samples backing the trend chart.

use std::sync::{Arc, Mutex};

use crate::domain::foundation::Timestamp;
use crate::protocol::ServerEvent;

use super::channel::ClientChannel;
use super::event::ChannelEvent;
use super::registry::Subscription;

/// Default window width in samples. At the 2s sampling interval this is
/// one minute of history.
pub const DEFAULT_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPoint {
    pub timestamp: Timestamp,
    pub load: u32,
}

/// Summary statistics over the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadStatistics {
    pub count: usize,
    pub average: f64,
    pub minimum: u32,
    pub maximum: u32,
}

/// Pure windowed series, testable without a channel.
#[derive(Debug)]
pub struct LoadHistory {
    points: Vec<LoadPoint>,
    window: usize,
}

impl Default for LoadHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl LoadHistory {
    pub fn new(window: usize) -> Self {
        Self {
            points: Vec::new(),
            window: window.max(1),
        }
    }

    /// Appends a sample, dropping the oldest once the window is full.
    pub fn push(&mut self, point: LoadPoint) {
        self.points.push(point);
        if self.points.len() > self.window {
            let excess = self.points.len() - self.window;
            self.points.drain(..excess);
        }
    }

    /// Shrinks or grows the window, truncating from the front if needed.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        if self.points.len() > self.window {
            let excess = self.points.len() - self.window;
            self.points.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[LoadPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<LoadPoint> {
        self.points.last().copied()
    }

    pub fn statistics(&self) -> Option<LoadStatistics> {
        if self.points.is_empty() {
            return None;
        }
        let loads = self.points.iter().map(|p| p.load);
        let sum: u64 = loads.clone().map(u64::from).sum();
        Some(LoadStatistics {
            count: self.points.len(),
            average: sum as f64 / self.points.len() as f64,
            minimum: loads.clone().min().unwrap_or(0),
            maximum: loads.max().unwrap_or(0),
        })
    }
}

/// A live series bound to a channel's `update` stream.
pub struct LoadSeries {
    state: Arc<Mutex<LoadHistory>>,
    _subscription: Subscription,
}

impl LoadSeries {
    pub fn attach(channel: &ClientChannel) -> Self {
        let state = Arc::new(Mutex::new(LoadHistory::default()));
        let subscription = {
            let state = Arc::clone(&state);
            channel.on("update", move |event| {
                if let ChannelEvent::Message(ServerEvent::Update(update)) = event {
                    state.lock().expect("load series lock poisoned").push(LoadPoint {
                        timestamp: update.timestamp,
                        load: update.load,
                    });
                }
            })
        };
        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn points(&self) -> Vec<LoadPoint> {
        self.state
            .lock()
            .expect("load series lock poisoned")
            .points()
            .to_vec()
    }

    pub fn latest(&self) -> Option<LoadPoint> {
        self.state.lock().expect("load series lock poisoned").latest()
    }

    pub fn statistics(&self) -> Option<LoadStatistics> {
        self.state
            .lock()
            .expect("load series lock poisoned")
            .statistics()
    }

    pub fn set_window(&self, window: usize) {
        self.state
            .lock()
            .expect("load series lock poisoned")
            .set_window(window);
    }

    pub fn clear(&self) {
        self.state.lock().expect("load series lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ms: i64, load: u32) -> LoadPoint {
        LoadPoint {
            timestamp: Timestamp::from_unix_millis(ms).unwrap(),
            load,
        }
    }

    #[test]
    fn window_drops_oldest_samples() {
        let mut history = LoadHistory::new(3);
        for i in 0..5 {
            history.push(point(i, 1000 + i as u32));
        }
        let loads: Vec<u32> = history.points().iter().map(|p| p.load).collect();
        assert_eq!(loads, vec![1002, 1003, 1004]);
    }

    #[test]
    fn shrinking_the_window_truncates_from_the_front() {
        let mut history = LoadHistory::new(5);
        for i in 0..5 {
            history.push(point(i, i as u32));
        }
        history.set_window(2);
        let loads: Vec<u32> = history.points().iter().map(|p| p.load).collect();
        assert_eq!(loads, vec![3, 4]);
    }

    #[test]
    fn statistics_over_the_window() {
        let mut history = LoadHistory::new(10);
        history.push(point(0, 2000));
        history.push(point(1, 4000));
        let stats = history.statistics().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average, 3000.0);
        assert_eq!(stats.minimum, 2000);
        assert_eq!(stats.maximum, 4000);
    }

    #[test]
    fn statistics_of_empty_history_is_none() {
        assert!(LoadHistory::default().statistics().is_none());
        assert!(LoadHistory::default().latest().is_none());
    }
}
