// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! Cancellable repeating task for timed polls

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Runs one async job on a fixed interval until cancelled.
///
/// The first run happens immediately. Each run is awaited before the next
/// tick is taken, and ticks missed while a run was in progress are skipped.
pub struct PollScheduler {
    name: String,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: Mutex::new(None),
        }
    }

    /// Start (or restart) the repeating job
    pub fn start<F, Fut>(&self, interval: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.handle.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let name = self.name.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                debug!("Scheduled task '{}' tick", name);
                job().await;
            }
        }));
        debug!("Scheduled task '{}' with interval {:?}", self.name, interval);
    }

    /// Stop the job. Returns false if it was not running.
    pub fn cancel(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                handle.abort();
                debug!("Cancelled scheduled task '{}'", self.name);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
