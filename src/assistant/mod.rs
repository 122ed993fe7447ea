//! Read-only telemetry context for the chat assistant
//!
//! The assistant owns its own model call; this module only renders the latest
//! readings into the context sentence it prepends to every conversation.

use std::fmt;

use serde::Serialize;

use crate::core::TelemetryState;
use crate::sensors::RawSnapshot;

const PREAMBLE: &str = "As an AI health assistant, analyze the data for diabetic foot ulcer \
monitoring, suggest treatment if needed, give alerts for abnormal values, recommend daily \
activities, and provide a suitable diet plan.";

/// Latest readings as the assistant sees them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthContext {
    pub channels: RawSnapshot,
    pub heart_rate_bpm: u32,
    pub spo2_pct: u32,
}

impl HealthContext {
    pub fn from_state(state: &TelemetryState) -> Option<Self> {
        state.snapshot.as_ref().map(|s| Self {
            channels: s.raw,
            heart_rate_bpm: s.heart_rate_bpm,
            spo2_pct: s.spo2_pct,
        })
    }
}

impl fmt::Display for HealthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.channels;
        write!(
            f,
            "{} User's latest health data: heart rate {} bpm, SpO₂ {}%, heel pressure {} kPa, \
             ball pressure {} kPa, temperature1 {}°C, temperature2 {}°C. User is diabetic.",
            PREAMBLE,
            self.heart_rate_bpm,
            self.spo2_pct,
            c.heel_pressure,
            c.ball_pressure,
            c.temp1,
            c.temp2,
        )
    }
}
