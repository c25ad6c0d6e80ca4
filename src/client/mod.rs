//! Client side: the auto-reconnecting channel plus the view models that
//! consume it.

mod channel;
mod event;
mod feed;
mod heatmap;
mod queue;
mod registry;
mod series;

pub use channel::{ClientChannel, ConnectionState};
pub use event::ChannelEvent;
pub use feed::{AlarmFeed, AlarmFilter, FeedState};
pub use heatmap::{placeholder_table, HeatmapView, DEFAULT_YEAR};
pub use queue::OutboundQueue;
pub use registry::{Subscription, SubscriptionRegistry};
pub use series::{LoadHistory, LoadPoint, LoadSeries, LoadStatistics, DEFAULT_WINDOW};
