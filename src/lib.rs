// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! DFU Monitor - telemetry polling and alert engine
//!
//! Polls the remote feed of a diabetic foot ulcer monitoring insole, enriches
//! each reading with presentation vitals, classifies abnormal temperature and
//! pressure, and drives a trigger-once alert with haptic feedback.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       Telemetry Store                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────┐  ┌────────────┐  ┌────────────┐  │
//! │  │  Reading  │→ │  Vitals  │→ │ Threshold  │→ │   Alert    │  │
//! │  │  Source   │  │Synthesize│  │ Classifier │  │ Lifecycle  │  │
//! │  └───────────┘  └──────────┘  └────────────┘  └────────────┘  │
//! │       ↑                                             ↓         │
//! │  ┌───────────┐                                ┌────────────┐  │
//! │  │ Scheduler │                                │  Haptics   │  │
//! │  └───────────┘                                └────────────┘  │
//! │                         ↓                                     │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │              State Bus (subscribe / watch)              │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod core;
pub mod sensors;
pub mod analysis;
pub mod detection;
pub mod assistant;
pub mod config;

// Re-exports for convenience
pub use config::Config;
pub use core::{ErrorKind, StateBus, Subscription, TelemetryState, TelemetryStore};
pub use sensors::{Channel, ChannelValue, FeedError, HttpFeed, RawSnapshot, ReadingSource};
pub use analysis::{EnrichedSnapshot, VitalsSynthesizer};
pub use detection::{AlertClassification, AlertManager, AlertState, Haptics, ThresholdClassifier};
pub use assistant::HealthContext;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = "DFU Monitor";
