//! Telemetry store - owns the poll loop and publishes telemetry state

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{History, HistoryPoint, PollScheduler, StateBus, Subscription, TelemetryState};
use crate::analysis::VitalsSynthesizer;
use crate::assistant::HealthContext;
use crate::config::Config;
use crate::detection::{
    AlertManager, AlertTransition, Haptics, LogHaptics, NoHaptics, ThresholdClassifier, Thresholds,
    VibrationPattern,
};
use crate::sensors::{FeedError, FeedSimulator, HttpFeed, RawSnapshot, ReadingSource};

type PendingPoll = Shared<BoxFuture<'static, ()>>;

/// Polls a reading source, enriches and classifies each snapshot, drives the
/// alert lifecycle and publishes the resulting state.
///
/// At most one poll is in flight per store; concurrent requests join it.
/// After [`stop`](Self::stop) no further state is published.
pub struct TelemetryStore {
    inner: Arc<StoreInner>,
    scheduler: PollScheduler,
    interval: Duration,
}

struct StoreInner {
    source: Arc<dyn ReadingSource>,
    synthesizer: Mutex<VitalsSynthesizer>,
    classifier: ThresholdClassifier,
    alerts: Mutex<AlertManager>,
    haptics: Arc<dyn Haptics>,
    pattern: VibrationPattern,
    bus: StateBus,
    history: Mutex<History>,
    in_flight: Mutex<Option<PendingPoll>>,
    // Serialises read-modify-publish of the state; reentrant so listeners may
    // call back into the store
    publish_lock: ReentrantMutex<()>,
    stopped: AtomicBool,
    polls: AtomicU64,
}

/// Builder for [`TelemetryStore`]
pub struct StoreBuilder {
    source: Arc<dyn ReadingSource>,
    interval: Duration,
    thresholds: Thresholds,
    history_capacity: usize,
    haptics: Arc<dyn Haptics>,
    pattern: VibrationPattern,
    synthesizer: Option<VitalsSynthesizer>,
}

impl StoreBuilder {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn haptics(mut self, haptics: Arc<dyn Haptics>, pattern: VibrationPattern) -> Self {
        self.haptics = haptics;
        self.pattern = pattern;
        self
    }

    pub fn synthesizer(mut self, synthesizer: VitalsSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn build(self) -> TelemetryStore {
        let inner = StoreInner {
            source: self.source,
            synthesizer: Mutex::new(self.synthesizer.unwrap_or_default()),
            classifier: ThresholdClassifier::new(self.thresholds),
            alerts: Mutex::new(AlertManager::new()),
            haptics: self.haptics,
            pattern: self.pattern,
            bus: StateBus::new(TelemetryState::default()),
            history: Mutex::new(History::new(self.history_capacity)),
            in_flight: Mutex::new(None),
            publish_lock: ReentrantMutex::new(()),
            stopped: AtomicBool::new(false),
            polls: AtomicU64::new(0),
        };

        TelemetryStore {
            scheduler: PollScheduler::new(&format!("poll:{}", inner.source.id())),
            inner: Arc::new(inner),
            interval: self.interval,
        }
    }
}

impl TelemetryStore {
    pub fn builder(source: Arc<dyn ReadingSource>) -> StoreBuilder {
        StoreBuilder {
            source,
            interval: Duration::from_secs(30),
            thresholds: Thresholds::default(),
            history_capacity: 120,
            haptics: Arc::new(NoHaptics),
            pattern: VibrationPattern::default(),
            synthesizer: None,
        }
    }

    /// Build a store from configuration: the HTTP feed, or the simulator in
    /// demo mode.
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        let source: Arc<dyn ReadingSource> = if config.demo_mode {
            Arc::new(FeedSimulator::new("demo-feed"))
        } else {
            Arc::new(HttpFeed::new(&config.feed)?)
        };

        let haptics: Arc<dyn Haptics> = if config.haptics.enabled {
            Arc::new(LogHaptics)
        } else {
            Arc::new(NoHaptics)
        };

        let synthesizer = match config.vitals.seed {
            Some(seed) => VitalsSynthesizer::seeded(seed),
            None => VitalsSynthesizer::new(),
        };

        Ok(Self::builder(source)
            .interval(config.polling.interval())
            .thresholds(config.thresholds)
            .history_capacity(config.polling.history_capacity)
            .haptics(haptics, config.haptics.pattern())
            .synthesizer(synthesizer)
            .build())
    }

    /// Start the poll loop. The first poll runs immediately.
    pub fn start(&self) {
        if self.inner.is_stopped() {
            warn!("Ignoring start on a stopped telemetry store");
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.scheduler.start(self.interval, move || inner.request_poll());
        info!(
            "Telemetry polling started for {} every {:?}",
            self.inner.source.id(),
            self.interval
        );
    }

    /// Poll now without touching the timer schedule. Joins the in-flight
    /// poll if there is one; resolves once that poll has been published.
    pub async fn refresh_now(&self) {
        if self.inner.is_stopped() {
            debug!("Refresh ignored, store stopped");
            return;
        }
        self.inner.request_poll().await;
    }

    /// Cancel the timer and discard any in-flight result. Idempotent.
    ///
    /// Waits for a publication already in progress, so nothing is published
    /// and no haptics fire once this returns.
    pub fn stop(&self) {
        let _guard = self.inner.publish_lock.lock();
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.scheduler.cancel();
        info!("Telemetry polling stopped for {}", self.inner.source.id());
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    /// Hide the visible alert. The session stays armed.
    pub fn dismiss_alert(&self) -> bool {
        let inner = &self.inner;
        let mut changed = false;
        inner.transition(|current| {
            changed = inner.alerts.lock().dismiss();
            changed.then(|| TelemetryState {
                alert: inner.alerts.lock().state(),
                ..current.clone()
            })
        });
        changed
    }

    pub fn state(&self) -> Arc<TelemetryState> {
        self.inner.bus.current()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TelemetryState) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(listener)
    }

    pub fn watch(&self) -> watch::Receiver<Arc<TelemetryState>> {
        self.inner.bus.watch()
    }

    /// Latest four-channel reading, for collaborators that only read
    pub fn channel_snapshot(&self) -> Option<RawSnapshot> {
        self.state().snapshot.as_ref().map(|s| s.raw)
    }

    /// Context string source for the chat assistant
    pub fn health_context(&self) -> Option<HealthContext> {
        HealthContext::from_state(&self.state())
    }

    pub fn history(&self) -> Vec<HistoryPoint> {
        self.inner.history.lock().points()
    }

    /// Number of polls that reached the reading source
    pub fn poll_count(&self) -> u64 {
        self.inner.polls.load(Ordering::Relaxed)
    }
}

impl Drop for TelemetryStore {
    fn drop(&mut self) {
        self.stop();
    }
}

impl StoreInner {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Start a poll, or join the one already in flight
    fn request_poll(self: &Arc<Self>) -> PendingPoll {
        let mut slot = self.in_flight.lock();
        if let Some(pending) = slot.as_ref() {
            debug!("Poll already in flight, joining it");
            return pending.clone();
        }

        let inner = Arc::clone(self);
        let poll = async move {
            inner.poll_once().await;
            inner.in_flight.lock().take();
        }
        .boxed()
        .shared();

        *slot = Some(poll.clone());
        // Driven by its own task so it completes even if every requester
        // is dropped (timer cancelled, caller gone)
        tokio::spawn(poll.clone());
        poll
    }

    async fn poll_once(&self) {
        if self.is_stopped() {
            return;
        }
        let seq = self.polls.fetch_add(1, Ordering::Relaxed) + 1;

        self.transition(|current| Some(current.with_loading(true)));

        let result = self.source.fetch_latest().await;

        if self.is_stopped() {
            debug!("Discarding result of poll #{}, store stopped", seq);
            return;
        }

        match result {
            Ok(fetched) => {
                self.transition(|current| Some(self.apply_reading(current, &fetched)));
                debug!("Poll #{} published", seq);
            }
            Err(e) => {
                warn!("Poll #{} failed for {}: {}", seq, self.source.id(), e);
                self.transition(|current| {
                    Some(TelemetryState {
                        loading: false,
                        last_error: Some((&e).into()),
                        ..current.clone()
                    })
                });
            }
        }
    }

    /// Merge, enrich, classify and run the alert lifecycle for one reading
    fn apply_reading(&self, current: &TelemetryState, fetched: &RawSnapshot) -> TelemetryState {
        let previous = current.snapshot.as_ref().map(|s| s.raw).unwrap_or_default();
        let raw = previous.overlay(fetched);

        let enriched = self.synthesizer.lock().synthesize(raw);
        let classification = self.classifier.classify(&enriched);

        let alert = {
            let mut alerts = self.alerts.lock();
            if alerts.observe(classification) == AlertTransition::Triggered {
                self.haptics.vibrate(&self.pattern);
            }
            alerts.state()
        };

        self.history.lock().push(HistoryPoint::from(&enriched));

        TelemetryState {
            snapshot: Some(enriched),
            alert,
            loading: false,
            last_error: None,
        }
    }

    /// Build the next state from the current one and publish it, unless the
    /// store has stopped or the builder returns `None`
    fn transition<F>(&self, build: F) -> Option<Arc<TelemetryState>>
    where
        F: FnOnce(&TelemetryState) -> Option<TelemetryState>,
    {
        let _guard = self.publish_lock.lock();
        if self.is_stopped() {
            return None;
        }
        let next = build(&self.bus.current())?;
        Some(self.bus.publish(next))
    }
}
