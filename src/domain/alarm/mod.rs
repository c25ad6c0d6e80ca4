//! Alarm records and the bounded ledger that retains them.

mod ledger;
mod record;

pub use ledger::{AlarmLedger, HandleOutcome, DEFAULT_CAPACITY};
pub use record::{AlarmId, AlarmKind, AlarmRecord, Severity};
