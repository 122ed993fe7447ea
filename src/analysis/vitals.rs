// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Presentation vitals synthesis
//!
//! The insole only reports temperature and pressure. Heart rate and SpO₂ are
//! shown for completeness: they are drawn from fixed plausible ranges on every
//! poll, and the chart series is a fixed illustrative waveform rather than a
//! history of real readings.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sensors::{Channel, ChannelValue, RawSnapshot};

/// Heart rate range in bpm (inclusive)
pub const HEART_RATE_RANGE: RangeInclusive<u32> = 75..=78;

/// SpO₂ range in percent (inclusive)
pub const SPO2_RANGE: RangeInclusive<u32> = 95..=97;

/// Number of points in the chart series
pub const CHART_POINTS: usize = 12;

const CHART_CENTER: f64 = 76.5;
const CHART_AMPLITUDE: f64 = 1.5;

/// Raw snapshot enriched with synthesized vitals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSnapshot {
    pub raw: RawSnapshot,
    pub heart_rate_bpm: u32,
    pub spo2_pct: u32,
    pub chart_series: Vec<f64>,
    pub captured_at: DateTime<Utc>,
}

impl EnrichedSnapshot {
    pub fn temp1(&self) -> ChannelValue {
        self.raw.temp1
    }

    pub fn temp2(&self) -> ChannelValue {
        self.raw.temp2
    }

    pub fn heel_pressure(&self) -> ChannelValue {
        self.raw.heel_pressure
    }

    pub fn ball_pressure(&self) -> ChannelValue {
        self.raw.ball_pressure
    }

    pub fn channel(&self, channel: Channel) -> ChannelValue {
        self.raw.get(channel)
    }
}

/// Derives heart rate, SpO₂ and the chart series for a raw snapshot
pub struct VitalsSynthesizer {
    rng: StdRng,
}

impl VitalsSynthesizer {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Deterministic synthesizer for tests and reproducible demos
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn synthesize(&mut self, raw: RawSnapshot) -> EnrichedSnapshot {
        EnrichedSnapshot {
            raw,
            heart_rate_bpm: self.rng.gen_range(HEART_RATE_RANGE),
            spo2_pct: self.rng.gen_range(SPO2_RANGE),
            chart_series: chart_series(),
            captured_at: Utc::now(),
        }
    }
}

impl Default for VitalsSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One full sine period over the series, centred at 76.5 bpm with ±1.5 swing
pub fn chart_series() -> Vec<f64> {
    let last = (CHART_POINTS - 1) as f64;
    (0..CHART_POINTS)
        .map(|i| CHART_CENTER + (i as f64 / last * 2.0 * PI).sin() * CHART_AMPLITUDE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitals_within_bounds() {
        let mut synth = VitalsSynthesizer::seeded(1);
        let raw = RawSnapshot::new(36.5, 37.0, 200.0, 150.0);

        for _ in 0..500 {
            let s = synth.synthesize(raw);
            assert!(HEART_RATE_RANGE.contains(&s.heart_rate_bpm));
            assert!([95, 96, 97].contains(&s.spo2_pct));
            assert_eq!(s.chart_series.len(), CHART_POINTS);
            assert_eq!(s.raw, raw);
        }
    }

    #[test]
    fn test_all_values_are_reachable() {
        let mut synth = VitalsSynthesizer::seeded(99);
        let mut heart = std::collections::HashSet::new();
        let mut spo2 = std::collections::HashSet::new();
        for _ in 0..1000 {
            let s = synth.synthesize(RawSnapshot::default());
            heart.insert(s.heart_rate_bpm);
            spo2.insert(s.spo2_pct);
        }
        assert_eq!(heart.len(), 4);
        assert_eq!(spo2.len(), 3);
    }

    #[test]
    fn test_same_seed_same_vitals() {
        let mut a = VitalsSynthesizer::seeded(5);
        let mut b = VitalsSynthesizer::seeded(5);
        for _ in 0..10 {
            let sa = a.synthesize(RawSnapshot::default());
            let sb = b.synthesize(RawSnapshot::default());
            assert_eq!((sa.heart_rate_bpm, sa.spo2_pct), (sb.heart_rate_bpm, sb.spo2_pct));
        }
    }

    #[test]
    fn test_chart_waveform_shape() {
        let series = chart_series();
        assert_eq!(series.len(), CHART_POINTS);
        assert!((series[0] - 76.5).abs() < 1e-9);
        assert!((series[CHART_POINTS - 1] - 76.5).abs() < 1e-9);
        for v in &series {
            assert!((75.0..=78.0).contains(v));
        }
    }
}
