//! Alarm record: one detected grid anomaly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Unique identifier for an alarm.
///
/// Derived from the record's creation time in Unix milliseconds; the ledger
/// bumps colliding values so identifiers are unique and monotonically
/// non-decreasing within the retained window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AlarmId(i64);

impl AlarmId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of anomaly that raised the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    /// Grid load crossed the configured threshold.
    LoadExceed,
    /// The grid reported a fault status.
    SystemFault,
}

/// How urgently operators should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Critical,
}

/// One detected anomaly, replicated to every connected dashboard.
///
/// `handled` flips false -> true exactly once, when any client acknowledges
/// the alarm; it never reverts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub id: AlarmId,
    pub kind: AlarmKind,
    pub message: String,
    pub severity: Severity,
    pub timestamp: Timestamp,
    pub handled: bool,
}
