// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/dfu-monitor

//! State bus - publishes telemetry state to UI subscribers

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::trace;

use super::TelemetryState;

type Listener = Arc<dyn Fn(&TelemetryState) + Send + Sync + 'static>;
type Listeners = RwLock<BTreeMap<u64, Listener>>;

/// States waiting for delivery, and whether some caller is already draining them
#[derive(Default)]
struct Fanout {
    queue: VecDeque<Arc<TelemetryState>>,
    draining: bool,
}

/// Holds the latest published state and fans it out to listeners.
///
/// Listeners run synchronously on the publishing task in subscription order.
/// A publish made from inside a listener is queued and delivered once the
/// current state has reached every listener, so each listener sees states in
/// publication order and ends on the latest one.
pub struct StateBus {
    current: watch::Sender<Arc<TelemetryState>>,
    listeners: Arc<Listeners>,
    fanout: Mutex<Fanout>,
    next_id: AtomicU64,
}

impl StateBus {
    pub fn new(initial: TelemetryState) -> Self {
        let (current, _) = watch::channel(Arc::new(initial));
        Self {
            current,
            listeners: Arc::new(RwLock::new(BTreeMap::new())),
            fanout: Mutex::new(Fanout::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Replace the current state and notify every listener. Called from inside
    /// a listener, the state is queued and delivered by the outer call.
    pub fn publish(&self, state: TelemetryState) -> Arc<TelemetryState> {
        let state = Arc::new(state);
        {
            let mut fanout = self.fanout.lock();
            self.current.send_replace(state.clone());
            fanout.queue.push_back(state.clone());
            if fanout.draining {
                trace!("Publish queued behind an in-progress fan-out");
                return state;
            }
            fanout.draining = true;
        }
        self.drain();
        state
    }

    /// Deliver queued states in order until the queue is empty
    fn drain(&self) {
        loop {
            let next = {
                let mut fanout = self.fanout.lock();
                match fanout.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        fanout.draining = false;
                        return;
                    }
                }
            };

            // Snapshot the listener list so callbacks may subscribe/unsubscribe
            let listeners: Vec<Listener> = self.listeners.read().values().cloned().collect();
            trace!("Publishing state to {} listeners", listeners.len());
            for listener in listeners {
                listener(&next);
            }
        }
    }

    pub fn current(&self) -> Arc<TelemetryState> {
        self.current.borrow().clone()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TelemetryState) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Async view of the state for consumers that prefer awaiting changes
    pub fn watch(&self) -> watch::Receiver<Arc<TelemetryState>> {
        self.current.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    /// Keep the listener registered for the lifetime of the bus
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_listeners_in_order() {
        let bus = StateBus::new(TelemetryState::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        let _sub = bus.subscribe(move |state| s.lock().push(state.loading));

        bus.publish(TelemetryState { loading: true, ..Default::default() });
        bus.publish(TelemetryState { loading: false, ..Default::default() });

        assert_eq!(*seen.lock(), vec![true, false]);
        assert!(!bus.current().loading);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = StateBus::new(TelemetryState::default());
        let count = Arc::new(AtomicU64::new(0));

        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(TelemetryState::default());
        sub.unsubscribe();
        bus.publish(TelemetryState::default());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_detached_listener_survives() {
        let bus = StateBus::new(TelemetryState::default());
        bus.subscribe(|_| {}).detach();
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_publish_from_listener_is_delivered_after_current() {
        let bus = Arc::new(StateBus::new(TelemetryState::default()));
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&bus);
        let f = first.clone();
        let _a = bus.subscribe(move |state| {
            f.lock().push(state.loading);
            if state.loading {
                if let Some(bus) = weak.upgrade() {
                    bus.publish(TelemetryState::default());
                }
            }
        });
        let s = second.clone();
        let _b = bus.subscribe(move |state| s.lock().push(state.loading));

        bus.publish(TelemetryState { loading: true, ..Default::default() });

        assert_eq!(*first.lock(), vec![true, false]);
        assert_eq!(*second.lock(), vec![true, false]);
        assert!(!bus.current().loading);
    }

    #[tokio::test]
    async fn test_watch_sees_latest() {
        let bus = StateBus::new(TelemetryState::default());
        let mut rx = bus.watch();

        bus.publish(TelemetryState { loading: true, ..Default::default() });
        rx.changed().await.unwrap();
        assert!(rx.borrow().loading);
    }
}
