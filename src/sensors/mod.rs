//! Sensor module - feed client, simulated source and channel types

mod traits;
mod feed;
mod simulator;

pub use traits::{Channel, ChannelValue, RawSnapshot, ReadingSource, FeedError};
pub use feed::{HttpFeed, parse_entry};
pub use simulator::FeedSimulator;
