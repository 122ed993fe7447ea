// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Feed simulator for demo/testing

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::prelude::*;
use rand_distr::Normal;

use super::{FeedError, RawSnapshot, ReadingSource};

/// Simulates a plausible insole feed, with occasional excursions past the
/// clinical thresholds and occasional dropped fields.
pub struct FeedSimulator {
    id: String,
    state: Mutex<SimState>,
}

struct SimState {
    rng: StdRng,
    drift: f64,
    anomaly_probability: f64,
    dropout_probability: f64,
}

impl FeedSimulator {
    pub fn new(id: &str) -> Self {
        Self::with_rng(id, StdRng::from_entropy())
    }

    pub fn seeded(id: &str, seed: u64) -> Self {
        Self::with_rng(id, StdRng::seed_from_u64(seed))
    }

    fn with_rng(id: &str, rng: StdRng) -> Self {
        Self {
            id: id.to_string(),
            state: Mutex::new(SimState {
                rng,
                drift: 0.0,
                anomaly_probability: 0.05,
                dropout_probability: 0.02,
            }),
        }
    }

    /// Override how often a reading spikes past thresholds (0-1)
    pub fn with_anomaly_probability(self, p: f64) -> Self {
        self.state.lock().anomaly_probability = p.clamp(0.0, 1.0);
        self
    }
}

impl SimState {
    fn next_snapshot(&mut self) -> RawSnapshot {
        self.drift = (self.drift + self.rng.gen_range(-0.05..0.05)).clamp(-0.8, 0.8);

        let skin: Normal<f64> = Normal::new(36.4 + self.drift, 0.25).unwrap();
        let heel: Normal<f64> = Normal::new(220.0, 40.0).unwrap();
        let ball: Normal<f64> = Normal::new(180.0, 35.0).unwrap();

        let mut temp1 = skin.sample(&mut self.rng);
        let temp2 = skin.sample(&mut self.rng) + 0.3;
        let mut heel_pressure = heel.sample(&mut self.rng).max(0.0);
        let ball_pressure = ball.sample(&mut self.rng).max(0.0);

        // Inflammation hot spot or sustained heel loading
        if self.rng.gen::<f64>() < self.anomaly_probability {
            if self.rng.gen_bool(0.5) {
                temp1 += self.rng.gen_range(1.8..3.0);
            } else {
                heel_pressure += self.rng.gen_range(200.0..320.0);
            }
        }

        let mut snapshot = RawSnapshot::new(temp1, temp2, heel_pressure, ball_pressure);

        // The real feed occasionally leaves a field blank
        for channel in super::Channel::ALL {
            if self.rng.gen::<f64>() < self.dropout_probability {
                snapshot = snapshot.with(channel, super::ChannelValue::Unresolved);
            }
        }

        snapshot
    }
}

#[async_trait]
impl ReadingSource for FeedSimulator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_latest(&self) -> Result<RawSnapshot, FeedError> {
        Ok(self.state.lock().next_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_simulator_is_reproducible() {
        let a = FeedSimulator::seeded("sim", 7);
        let b = FeedSimulator::seeded("sim", 7);
        for _ in 0..5 {
            assert_eq!(a.fetch_latest().await.unwrap(), b.fetch_latest().await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_readings_stay_physical() {
        let sim = FeedSimulator::seeded("sim", 11).with_anomaly_probability(1.0);
        for _ in 0..200 {
            let s = sim.fetch_latest().await.unwrap();
            if let Some(p) = s.heel_pressure.value() {
                assert!(p >= 0.0);
            }
            if let Some(p) = s.ball_pressure.value() {
                assert!(p >= 0.0 && p.is_finite());
            }
            if let Some(t) = s.temp2.value() {
                assert!((30.0..45.0).contains(&t));
            }
        }
    }
}
