// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Alert lifecycle
//!
//! ```text
//!   Clear ──(classification != NoAlert)──▶ Triggered ──dismiss()──▶ Dismissed
//!  (armed=false, visible=false)    (armed=true, visible=true)   (armed=true, visible=false)
//! ```
//!
//! Once armed the session never re-arms: later polls update
//! `last_classification` but cannot trigger again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AlertClassification;

/// Alert state carried in every published telemetry state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertState {
    /// An alert has fired this session
    pub armed: bool,

    /// The fired alert has not been dismissed. Implies `armed`.
    pub visible: bool,

    /// Classification of the most recent successful poll
    pub last_classification: AlertClassification,

    /// Classification that armed the session
    pub trigger: AlertClassification,

    /// When the session's alert fired
    pub triggered_at: Option<DateTime<Utc>>,
}

impl AlertState {
    pub fn is_clear(&self) -> bool {
        !self.armed
    }
}

/// What a single observation did to the alert state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Still clear
    None,
    /// Clear -> Triggered. The caller fires haptics exactly once for this.
    Triggered,
    /// Already armed, nothing changes besides the last classification
    Suppressed,
}

/// Owns `AlertState` across polls
#[derive(Debug, Default)]
pub struct AlertManager {
    state: AlertState,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Feed the classification of a successful poll
    pub fn observe(&mut self, classification: AlertClassification) -> AlertTransition {
        self.state.last_classification = classification;

        if self.state.armed {
            if classification.is_alert() {
                debug!("Alert suppressed, session already armed: {}", classification);
            }
            return AlertTransition::Suppressed;
        }

        if !classification.is_alert() {
            return AlertTransition::None;
        }

        self.state.armed = true;
        self.state.visible = true;
        self.state.trigger = classification;
        self.state.triggered_at = Some(Utc::now());
        info!("Alert triggered: {}", classification);
        AlertTransition::Triggered
    }

    /// Hide the visible alert. Returns whether anything changed.
    pub fn dismiss(&mut self) -> bool {
        if !self.state.visible {
            return false;
        }
        self.state.visible = false;
        info!("Alert dismissed");
        true
    }
}
