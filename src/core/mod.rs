//! Core module - telemetry store, poll scheduling and state publication

mod store;
mod scheduler;
mod event_bus;
mod history;

pub use store::{TelemetryStore, StoreBuilder};
pub use scheduler::PollScheduler;
pub use event_bus::{StateBus, Subscription};
pub use history::{History, HistoryPoint};

use serde::{Deserialize, Serialize};

use crate::analysis::EnrichedSnapshot;
use crate::detection::AlertState;
use crate::sensors::FeedError;

/// Error surfaced in published state. Never returned to subscribers as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Fetch or parse failure of the reading source
    Network { reason: String },
}

impl From<&FeedError> for ErrorKind {
    fn from(e: &FeedError) -> Self {
        ErrorKind::Network { reason: e.to_string() }
    }
}

/// Aggregate state published to subscribers after every transition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryState {
    /// Latest enriched snapshot, `None` until the first successful poll
    pub snapshot: Option<EnrichedSnapshot>,
    pub alert: AlertState,
    pub loading: bool,
    pub last_error: Option<ErrorKind>,
}

impl TelemetryState {
    /// Copy of this state with a new loading flag
    fn with_loading(&self, loading: bool) -> Self {
        Self { loading, ..self.clone() }
    }

    /// Alert message to render while the alert is visible. Prefers the
    /// current classification and falls back to the one that fired.
    pub fn visible_alert(&self) -> Option<String> {
        if !self.alert.visible {
            return None;
        }
        self.alert
            .last_classification
            .message()
            .or_else(|| self.alert.trigger.message())
    }
}
