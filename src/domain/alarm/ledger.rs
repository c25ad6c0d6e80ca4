//! Bounded, insertion-ordered history of alarm records.
//!
//! The ledger is the single authoritative copy of alarm state. It is owned
//! by the server's event router, which serializes every mutation; clients
//! hold replicas synchronized via snapshot + incremental events.

use std::collections::VecDeque;

use crate::domain::foundation::Timestamp;

use super::{AlarmId, AlarmKind, AlarmRecord, Severity};

/// Default number of records retained before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 100;

/// Result of a "mark handled" request against the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// The record existed and was open; it is now handled.
    Updated(AlarmRecord),
    /// The record existed but was already handled. Second calls are no-ops.
    AlreadyHandled,
    /// No record with that identifier is retained.
    NotFound,
}

/// Bounded ordered sequence of alarm records, newest first.
///
/// Capacity eviction drops the oldest record silently; records are never
/// deleted individually.
#[derive(Debug)]
pub struct AlarmLedger {
    records: VecDeque<AlarmRecord>,
    capacity: usize,
    last_id: i64,
}

impl AlarmLedger {
    /// Creates an empty ledger. A zero capacity is clamped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            last_id: 0,
        }
    }

    /// Appends a new open alarm, evicting the oldest record when full.
    ///
    /// The identifier derives from `now` in Unix milliseconds; when two
    /// alarms land in the same millisecond the second gets the next value,
    /// keeping identifiers unique and non-decreasing.
    pub fn raise(
        &mut self,
        kind: AlarmKind,
        message: impl Into<String>,
        severity: Severity,
        now: Timestamp,
    ) -> AlarmRecord {
        let mut id = now.unix_millis();
        if id <= self.last_id {
            id = self.last_id + 1;
        }
        self.last_id = id;

        let record = AlarmRecord {
            id: AlarmId::from_millis(id),
            kind,
            message: message.into(),
            severity,
            timestamp: now,
            handled: false,
        };

        self.records.push_front(record.clone());
        if self.records.len() > self.capacity {
            self.records.pop_back();
        }
        record
    }

    /// Flips a record's handled flag to true. One-directional: a handled
    /// record stays handled, and a second call reports `AlreadyHandled`
    /// without producing a new observable change.
    pub fn mark_handled(&mut self, id: AlarmId) -> HandleOutcome {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) if record.handled => HandleOutcome::AlreadyHandled,
            Some(record) => {
                record.handled = true;
                HandleOutcome::Updated(record.clone())
            }
            None => HandleOutcome::NotFound,
        }
    }

    /// Full point-in-time copy, newest first.
    pub fn snapshot(&self) -> Vec<AlarmRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count of records still awaiting acknowledgement.
    pub fn unhandled_count(&self) -> usize {
        self.records.iter().filter(|r| !r.handled).count()
    }
}

impl Default for AlarmLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
