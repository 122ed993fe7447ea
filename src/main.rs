// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! DFU Monitor - headless telemetry poller
//!
//! Polls the insole feed, logs every published state and fires the haptic
//! stand-in when an alert triggers. `--once` performs a single poll and prints
//! the resulting state as JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dfu_monitor::{Config, TelemetryState, TelemetryStore, NAME, VERSION};

/// DFU Monitor - diabetic foot ulcer telemetry poller
#[derive(Parser, Debug)]
#[command(name = "dfu-monitor")]
#[command(version = VERSION)]
#[command(about = "Poll a DFU insole feed and raise threshold alerts")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with a simulated feed
    #[arg(long)]
    demo: bool,

    /// Poll interval in seconds
    #[arg(long)]
    interval: Option<u64>,

    /// Feed read API key
    #[arg(long, env = "DFU_FEED_API_KEY")]
    api_key: Option<String>,

    /// Poll once, print the state as JSON and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // CLI flags win over RUST_LOG, which wins over the configured level
    let filter = if args.trace {
        EnvFilter::new("trace")
    } else if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{}", NAME, VERSION);

    if args.demo {
        config.demo_mode = true;
    }
    if let Some(secs) = args.interval {
        config.polling.interval_secs = secs;
    }
    if let Some(key) = args.api_key {
        config.feed.api_key = Some(key);
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    if args.once {
        rt.block_on(run_once(config))
    } else {
        rt.block_on(run_headless(config))
    }
}

async fn run_once(config: Config) -> Result<()> {
    let store = TelemetryStore::from_config(&config)?;
    store.refresh_now().await;
    let state = store.state();
    println!("{}", serde_json::to_string_pretty(&*state)?);
    store.stop();
    Ok(())
}

async fn run_headless(config: Config) -> Result<()> {
    let store = TelemetryStore::from_config(&config)?;

    let subscription = store.subscribe(log_state);
    store.start();

    info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    store.stop();
    subscription.unsubscribe();

    if let Some(context) = store.health_context() {
        info!("Last assistant context: {}", context);
    }
    info!("{} shutdown complete", NAME);
    Ok(())
}

fn log_state(state: &TelemetryState) {
    if state.loading {
        return;
    }
    if let Some(err) = &state.last_error {
        warn!("Feed unavailable, showing last known readings: {:?}", err);
        return;
    }
    if let Some(snapshot) = &state.snapshot {
        info!(
            "T1 {}°C | T2 {}°C | heel {} kPa | ball {} kPa | HR {} bpm | SpO₂ {}%",
            snapshot.temp1(),
            snapshot.temp2(),
            snapshot.heel_pressure(),
            snapshot.ball_pressure(),
            snapshot.heart_rate_bpm,
            snapshot.spo2_pct,
        );
    }
    if let Some(alert) = state.visible_alert() {
        warn!("⚠ {} - please check sensor readings", alert);
    }
}
