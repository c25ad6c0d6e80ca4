//! Client-side replica of the alarm ledger.
//!
//! Feeds on three events: `alarm_history` replaces the replica wholesale,
//! `alarm` prepends the newest record, `alarm_updated` swaps a record in
//! place. Acknowledging an alarm goes back through the channel so every
//! observer, not just this one, sees the update.

use std::sync::{Arc, Mutex};

use crate::domain::alarm::{AlarmId, AlarmRecord};
use crate::protocol::{ClientRequest, ServerEvent};

use super::channel::ClientChannel;
use super::event::ChannelEvent;
use super::registry::Subscription;

/// Which slice of the replica a widget wants to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmFilter {
    #[default]
    All,
    Unhandled,
    Handled,
}

/// Pure replica state, separated out so the merge rules are testable
/// without a channel.
#[derive(Debug, Default)]
pub struct FeedState {
    alarms: Vec<AlarmRecord>,
    filter: AlarmFilter,
}

impl FeedState {
    /// Prepends a new record (newest first).
    pub fn insert(&mut self, record: AlarmRecord) {
        self.alarms.insert(0, record);
    }

    /// Replaces the replica with a full snapshot.
    pub fn replace(&mut self, snapshot: Vec<AlarmRecord>) {
        self.alarms = snapshot;
    }

    /// Swaps an updated record in place; unknown ids are ignored.
    pub fn apply_update(&mut self, record: AlarmRecord) {
        if let Some(slot) = self.alarms.iter_mut().find(|a| a.id == record.id) {
            *slot = record;
        }
    }

    pub fn unhandled_count(&self) -> usize {
        self.alarms.iter().filter(|a| !a.handled).count()
    }

    pub fn set_filter(&mut self, filter: AlarmFilter) {
        self.filter = filter;
    }

    /// The records matching the active filter, newest first.
    pub fn filtered(&self) -> Vec<AlarmRecord> {
        self.alarms
            .iter()
            .filter(|a| match self.filter {
                AlarmFilter::All => true,
                AlarmFilter::Unhandled => !a.handled,
                AlarmFilter::Handled => a.handled,
            })
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<AlarmRecord> {
        self.alarms.clone()
    }
}

/// A live replica attached to a channel.
pub struct AlarmFeed {
    channel: ClientChannel,
    state: Arc<Mutex<FeedState>>,
    _subscriptions: Vec<Subscription>,
}

impl AlarmFeed {
    /// Subscribes to the alarm events and requests the initial snapshot.
    /// The request rides the outbound queue if the channel is still
    /// connecting.
    pub fn attach(channel: &ClientChannel) -> Self {
        let state = Arc::new(Mutex::new(FeedState::default()));

        let on_alarm = {
            let state = Arc::clone(&state);
            channel.on("alarm", move |event| {
                if let ChannelEvent::Message(ServerEvent::Alarm(record)) = event {
                    state.lock().expect("alarm feed lock poisoned").insert(record.clone());
                }
            })
        };
        let on_history = {
            let state = Arc::clone(&state);
            channel.on("alarm_history", move |event| {
                if let ChannelEvent::Message(ServerEvent::AlarmHistory { alarms }) = event {
                    state
                        .lock()
                        .expect("alarm feed lock poisoned")
                        .replace(alarms.clone());
                }
            })
        };
        let on_updated = {
            let state = Arc::clone(&state);
            channel.on("alarm_updated", move |event| {
                if let ChannelEvent::Message(ServerEvent::AlarmUpdated(record)) = event {
                    state
                        .lock()
                        .expect("alarm feed lock poisoned")
                        .apply_update(record.clone());
                }
            })
        };

        channel.emit(ClientRequest::RequestAlarmHistory);

        Self {
            channel: channel.clone(),
            state,
            _subscriptions: vec![on_alarm, on_history, on_updated],
        }
    }

    /// Asks the server to mark an alarm handled. The local replica is not
    /// touched here; it converges when the `alarm_updated` broadcast
    /// comes back.
    pub fn handle_alarm(&self, id: AlarmId) {
        self.channel.emit(ClientRequest::HandleAlarm { id });
    }

    pub fn alarms(&self) -> Vec<AlarmRecord> {
        self.state.lock().expect("alarm feed lock poisoned").all()
    }

    pub fn filtered(&self) -> Vec<AlarmRecord> {
        self.state.lock().expect("alarm feed lock poisoned").filtered()
    }

    pub fn set_filter(&self, filter: AlarmFilter) {
        self.state
            .lock()
            .expect("alarm feed lock poisoned")
            .set_filter(filter);
    }

    pub fn unhandled_count(&self) -> usize {
        self.state
            .lock()
            .expect("alarm feed lock poisoned")
            .unhandled_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alarm::{AlarmKind, Severity};
    use crate::domain::foundation::Timestamp;

    fn record(id: i64, handled: bool) -> AlarmRecord {
        AlarmRecord {
            id: AlarmId::from_millis(id),
            kind: AlarmKind::LoadExceed,
            message: format!("alarm {id}"),
            severity: Severity::High,
            timestamp: Timestamp::from_unix_millis(id).unwrap(),
            handled,
        }
    }

    #[test]
    fn insert_keeps_newest_first() {
        let mut state = FeedState::default();
        state.insert(record(1, false));
        state.insert(record(2, false));
        let all = state.all();
        assert_eq!(all[0].id, AlarmId::from_millis(2));
        assert_eq!(all[1].id, AlarmId::from_millis(1));
    }

    #[test]
    fn apply_update_swaps_matching_record() {
        let mut state = FeedState::default();
        state.insert(record(1, false));
        state.apply_update(record(1, true));
        assert!(state.all()[0].handled);
        assert_eq!(state.unhandled_count(), 0);
    }

    #[test]
    fn apply_update_ignores_unknown_id() {
        let mut state = FeedState::default();
        state.insert(record(1, false));
        state.apply_update(record(99, true));
        assert_eq!(state.all().len(), 1);
        assert!(!state.all()[0].handled);
    }

    #[test]
    fn replace_overwrites_the_replica() {
        let mut state = FeedState::default();
        state.insert(record(1, false));
        state.replace(vec![record(5, true), record(4, false)]);
        assert_eq!(state.all().len(), 2);
        assert_eq!(state.unhandled_count(), 1);
    }

    #[test]
    fn filter_selects_the_requested_slice() {
        let mut state = FeedState::default();
        state.insert(record(1, true));
        state.insert(record(2, false));

        state.set_filter(AlarmFilter::Unhandled);
        assert_eq!(state.filtered().len(), 1);
        assert!(!state.filtered()[0].handled);

        state.set_filter(AlarmFilter::Handled);
        assert_eq!(state.filtered().len(), 1);
        assert!(state.filtered()[0].handled);

        state.set_filter(AlarmFilter::All);
        assert_eq!(state.filtered().len(), 2);
    }
}
