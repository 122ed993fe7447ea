//! Rolling in-memory window of enriched snapshots for charting

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::EnrichedSnapshot;
use crate::sensors::{Channel, RawSnapshot};

/// One charted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub at: DateTime<Utc>,
    pub raw: RawSnapshot,
    pub heart_rate_bpm: u32,
    pub spo2_pct: u32,
}

impl From<&EnrichedSnapshot> for HistoryPoint {
    fn from(s: &EnrichedSnapshot) -> Self {
        Self {
            at: s.captured_at,
            raw: s.raw,
            heart_rate_bpm: s.heart_rate_bpm,
            spo2_pct: s.spo2_pct,
        }
    }
}

/// Bounded FIFO, oldest samples evicted first
#[derive(Debug, Clone)]
pub struct History {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn points(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }

    /// Resolved values of one channel, oldest first
    pub fn series(&self, channel: Channel) -> Vec<(DateTime<Utc>, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.raw.get(channel).value().map(|v| (p.at, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::ChannelValue;

    fn point(heel: ChannelValue) -> HistoryPoint {
        HistoryPoint {
            at: Utc::now(),
            raw: RawSnapshot::default().with(Channel::HeelPressure, heel),
            heart_rate_bpm: 76,
            spo2_pct: 96,
        }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = History::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.push(point(ChannelValue::Reading(v)));
        }
        assert_eq!(history.len(), 3);
        let values: Vec<f64> = history
            .series(Channel::HeelPressure)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_series_skips_unresolved() {
        let mut history = History::new(10);
        history.push(point(ChannelValue::Unresolved));
        history.push(point(ChannelValue::Reading(410.0)));
        assert_eq!(history.series(Channel::HeelPressure).len(), 1);
        assert!(history.series(Channel::Temp1).is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::new(0);
        history.push(point(ChannelValue::Reading(1.0)));
        history.push(point(ChannelValue::Reading(2.0)));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
    }
}
