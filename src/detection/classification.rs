// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Threshold classification of a snapshot

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::EnrichedSnapshot;
use crate::sensors::{Channel, ChannelValue};

/// Clinical thresholds used by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Skin temperature below this is abnormal (°C)
    pub temp_low: f64,

    /// Skin temperature above this is abnormal (°C)
    pub temp_high: f64,

    /// Plantar pressure above this is abnormal (kPa)
    pub pressure_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_low: 35.0,
            temp_high: 38.0,
            pressure_high: 400.0,
        }
    }
}

/// Outcome of classifying one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AlertClassification {
    #[default]
    NoAlert,
    Temperature { channel: Channel, value: f64 },
    Pressure { channel: Channel, value: f64 },
}

impl AlertClassification {
    pub fn is_alert(&self) -> bool {
        !matches!(self, AlertClassification::NoAlert)
    }

    pub fn channel(&self) -> Option<Channel> {
        match self {
            AlertClassification::Temperature { channel, .. }
            | AlertClassification::Pressure { channel, .. } => Some(*channel),
            AlertClassification::NoAlert => None,
        }
    }

    /// Message shown on the alert card, `None` when there is nothing to show
    pub fn message(&self) -> Option<String> {
        match self {
            AlertClassification::NoAlert => None,
            AlertClassification::Temperature { channel, value } => Some(format!(
                "Abnormal {}: {}{}",
                channel.label(),
                ChannelValue::Reading(*value),
                channel.unit()
            )),
            AlertClassification::Pressure { channel, value } => Some(format!(
                "High {} Alert: {} {}",
                channel.label(),
                ChannelValue::Reading(*value),
                channel.unit()
            )),
        }
    }
}

impl fmt::Display for AlertClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => f.write_str(&msg),
            None => f.write_str("No alert"),
        }
    }
}

/// Evaluates snapshots against fixed thresholds in priority order:
/// temp1, temp2, heel pressure, ball pressure. First match wins.
#[derive(Debug, Clone, Default)]
pub struct ThresholdClassifier {
    thresholds: Thresholds,
}

impl ThresholdClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn classify(&self, snapshot: &EnrichedSnapshot) -> AlertClassification {
        // Nothing is compared until every channel has reported at least once
        let (Some(temp1), Some(temp2), Some(heel), Some(ball)) = (
            snapshot.temp1().value(),
            snapshot.temp2().value(),
            snapshot.heel_pressure().value(),
            snapshot.ball_pressure().value(),
        ) else {
            return AlertClassification::NoAlert;
        };

        let t = &self.thresholds;
        let temp_abnormal = |v: f64| v > t.temp_high || v < t.temp_low;

        if temp_abnormal(temp1) {
            AlertClassification::Temperature { channel: Channel::Temp1, value: temp1 }
        } else if temp_abnormal(temp2) {
            AlertClassification::Temperature { channel: Channel::Temp2, value: temp2 }
        } else if heel > t.pressure_high {
            AlertClassification::Pressure { channel: Channel::HeelPressure, value: heel }
        } else if ball > t.pressure_high {
            AlertClassification::Pressure { channel: Channel::BallPressure, value: ball }
        } else {
            AlertClassification::NoAlert
        }
    }
}
