//! Shared value objects used across the domain.

mod timestamp;

pub use timestamp::Timestamp;
