//! Haptic feedback - fire-and-forget vibration on alert

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Alternating wait/vibrate durations, starting with a wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrationPattern(pub Vec<u64>);

impl VibrationPattern {
    pub fn segments(&self) -> impl Iterator<Item = Duration> + '_ {
        self.0.iter().map(|ms| Duration::from_millis(*ms))
    }

    pub fn total(&self) -> Duration {
        self.segments().sum()
    }
}

impl Default for VibrationPattern {
    fn default() -> Self {
        Self(vec![0, 500, 200, 500])
    }
}

/// Haptic output device. No acknowledgement or backpressure.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, pattern: &VibrationPattern);
}

/// Headless stand-in: records the vibration in the log
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&self, pattern: &VibrationPattern) {
        info!(pattern = ?pattern.0, total_ms = pattern.total().as_millis() as u64, "Haptic alert");
    }
}

/// Disabled haptics
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self, _pattern: &VibrationPattern) {}
}
