// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Sensor traits and common types

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four scalar channels reported by the insole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Temp1,          // field1, °C
    Temp2,          // field2, °C
    HeelPressure,   // field3, kPa
    BallPressure,   // field4, kPa
}

impl Channel {
    /// All channels in feed order
    pub const ALL: [Channel; 4] = [
        Channel::Temp1,
        Channel::Temp2,
        Channel::HeelPressure,
        Channel::BallPressure,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Temp1 => "Temperature 1",
            Channel::Temp2 => "Temperature 2",
            Channel::HeelPressure => "Heel Pressure",
            Channel::BallPressure => "Ball Pressure",
        }
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Temp1 | Channel::Temp2 => "°C",
            Channel::HeelPressure | Channel::BallPressure => "kPa",
        }
    }

    /// JSON field name in the remote feed
    pub fn feed_field(&self) -> &'static str {
        match self {
            Channel::Temp1 => "field1",
            Channel::Temp2 => "field2",
            Channel::HeelPressure => "field3",
            Channel::BallPressure => "field4",
        }
    }
}

/// Value of a single channel.
///
/// `Unresolved` means no reading has ever been received for the channel and is
/// distinct from a legitimate zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ChannelValue {
    #[default]
    Unresolved,
    Reading(f64),
}

impl ChannelValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            ChannelValue::Reading(v) => Some(*v),
            ChannelValue::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ChannelValue::Reading(_))
    }

    /// Keep `self` if it carries a reading, otherwise fall back to `previous`
    pub fn or(self, previous: ChannelValue) -> ChannelValue {
        match self {
            ChannelValue::Reading(_) => self,
            ChannelValue::Unresolved => previous,
        }
    }
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelValue::Reading(v) => write!(f, "{:.1}", v),
            ChannelValue::Unresolved => f.write_str("--"),
        }
    }
}

impl From<f64> for ChannelValue {
    fn from(v: f64) -> Self {
        ChannelValue::Reading(v)
    }
}

/// One set of raw channel values at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub temp1: ChannelValue,
    pub temp2: ChannelValue,
    pub heel_pressure: ChannelValue,
    pub ball_pressure: ChannelValue,
}

impl RawSnapshot {
    pub fn new(
        temp1: impl Into<ChannelValue>,
        temp2: impl Into<ChannelValue>,
        heel_pressure: impl Into<ChannelValue>,
        ball_pressure: impl Into<ChannelValue>,
    ) -> Self {
        Self {
            temp1: temp1.into(),
            temp2: temp2.into(),
            heel_pressure: heel_pressure.into(),
            ball_pressure: ball_pressure.into(),
        }
    }

    pub fn get(&self, channel: Channel) -> ChannelValue {
        match channel {
            Channel::Temp1 => self.temp1,
            Channel::Temp2 => self.temp2,
            Channel::HeelPressure => self.heel_pressure,
            Channel::BallPressure => self.ball_pressure,
        }
    }

    /// Builder-style setter for a single channel
    pub fn with(mut self, channel: Channel, value: impl Into<ChannelValue>) -> Self {
        let value = value.into();
        match channel {
            Channel::Temp1 => self.temp1 = value,
            Channel::Temp2 => self.temp2 = value,
            Channel::HeelPressure => self.heel_pressure = value,
            Channel::BallPressure => self.ball_pressure = value,
        }
        self
    }

    /// Field-wise merge of a freshly fetched snapshot over this one.
    /// Channels the fetch did not resolve keep their previous value.
    pub fn overlay(&self, fetched: &RawSnapshot) -> RawSnapshot {
        RawSnapshot {
            temp1: fetched.temp1.or(self.temp1),
            temp2: fetched.temp2.or(self.temp2),
            heel_pressure: fetched.heel_pressure.or(self.heel_pressure),
            ball_pressure: fetched.ball_pressure.or(self.ball_pressure),
        }
    }

    pub fn is_fully_resolved(&self) -> bool {
        Channel::ALL.iter().all(|c| self.get(*c).is_resolved())
    }
}

/// Failures of a single fetch against the reading source
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request timed out")]
    Timeout,

    #[error("feed transport error: {0}")]
    Transport(String),

    #[error("feed returned HTTP {0}")]
    Status(u16),

    #[error("malformed feed body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout
        } else if e.is_decode() {
            FeedError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FeedError::Status(status.as_u16())
        } else {
            FeedError::Transport(e.to_string())
        }
    }
}

/// Anything that can produce the latest raw snapshot
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Short identifier used in logs
    fn id(&self) -> &str;

    /// Fetch the most recent reading. Channels missing from the source are
    /// returned as `Unresolved`; no retry is attempted.
    async fn fetch_latest(&self) -> Result<RawSnapshot, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_one_decimal() {
        assert_eq!(ChannelValue::Reading(420.0).to_string(), "420.0");
        assert_eq!(ChannelValue::Reading(36.549).to_string(), "36.5");
        assert_eq!(ChannelValue::Unresolved.to_string(), "--");
    }

    #[test]
    fn test_zero_is_not_unresolved() {
        let zero = ChannelValue::Reading(0.0);
        assert!(zero.is_resolved());
        assert_eq!(zero.value(), Some(0.0));
        assert_eq!(ChannelValue::Unresolved.value(), None);
    }

    #[test]
    fn test_overlay_keeps_previous_for_missing_fields() {
        let previous = RawSnapshot::new(36.5, 37.0, 420.0, 150.0);
        let fetched = RawSnapshot::default().with(Channel::Temp1, 36.0);

        let merged = previous.overlay(&fetched);
        assert_eq!(merged.temp1, ChannelValue::Reading(36.0));
        assert_eq!(merged.temp2, ChannelValue::Reading(37.0));
        assert_eq!(merged.heel_pressure, ChannelValue::Reading(420.0));
        assert_eq!(merged.ball_pressure, ChannelValue::Reading(150.0));
    }

    #[test]
    fn test_overlay_on_empty_stays_unresolved() {
        let fetched = RawSnapshot::default().with(Channel::Temp2, 35.5);
        let merged = RawSnapshot::default().overlay(&fetched);
        assert!(!merged.is_fully_resolved());
        assert_eq!(merged.temp1, ChannelValue::Unresolved);
        assert_eq!(merged.temp2, ChannelValue::Reading(35.5));
    }
}
