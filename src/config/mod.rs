// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::detection::{Thresholds, VibrationPattern};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Use the simulated feed instead of the remote one
    pub demo_mode: bool,

    /// Remote feed
    pub feed: FeedConfig,

    /// Poll loop
    pub polling: PollingConfig,

    /// Alert thresholds
    pub thresholds: Thresholds,

    /// Haptic feedback
    pub haptics: HapticsConfig,

    /// Vitals synthesis
    pub vitals: VitalsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_mode: false,
            feed: FeedConfig::default(),
            polling: PollingConfig::default(),
            thresholds: Thresholds::default(),
            haptics: HapticsConfig::default(),
            vitals: VitalsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("dfu-monitor"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Remote feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed host, without trailing slash
    pub base_url: String,

    /// Channel holding the insole's fields
    pub channel_id: String,

    /// Read API key sent as the `api_key` query parameter
    pub api_key: Option<String>,

    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thingspeak.com".to_string(),
            channel_id: "2886060".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// URL of the channel's most recent entry
    pub fn latest_url(&self) -> String {
        format!(
            "{}/channels/{}/feeds/last.json",
            self.base_url.trim_end_matches('/'),
            self.channel_id
        )
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between scheduled polls
    pub interval_secs: u64,

    /// Number of enriched snapshots kept for charting
    pub history_capacity: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            history_capacity: 120,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Haptic feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticsConfig {
    pub enabled: bool,

    /// Alternating wait/vibrate durations in milliseconds
    pub pattern_ms: Vec<u64>,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern_ms: VibrationPattern::default().0,
        }
    }
}

impl HapticsConfig {
    pub fn pattern(&self) -> VibrationPattern {
        VibrationPattern(self.pattern_ms.clone())
    }
}

/// Vitals synthesis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Fixed RNG seed for reproducible heart rate / SpO₂ values
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.polling.interval(), Duration::from_secs(30));
        assert_eq!(config.thresholds.pressure_high, 400.0);
        assert_eq!(config.haptics.pattern_ms, vec![0, 500, 200, 500]);
        assert_eq!(
            config.feed.latest_url(),
            "https://api.thingspeak.com/channels/2886060/feeds/last.json"
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            demo_mode = true

            [feed]
            base_url = "http://localhost:8080/"
            api_key = "KEY"

            [thresholds]
            temp_low = 35.0
            temp_high = 38.5
            pressure_high = 380.0
            "#,
        )
        .unwrap();

        assert!(config.demo_mode);
        assert_eq!(
            config.feed.latest_url(),
            "http://localhost:8080/channels/2886060/feeds/last.json"
        );
        assert_eq!(config.feed.api_key.as_deref(), Some("KEY"));
        assert_eq!(config.thresholds.temp_high, 38.5);
        assert_eq!(config.polling.history_capacity, 120);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.polling.interval_secs, created.polling.interval_secs);
        assert_eq!(loaded.feed.channel_id, created.feed.channel_id);
    }
}
