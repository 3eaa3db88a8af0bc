// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The composition root.
//!
//! [`ResilienceEngine`] owns one connectivity monitor, one cache and one
//! action queue over a shared store, and turns "came online" into "drain the
//! queue". Construct it once at startup with [`ResilienceEngine::builder`] and
//! hand out references.
//!
//! Facade methods follow a fire-and-forget contract: storage failures are
//! logged, never returned, so UI callers cannot lose a queued write to an
//! error path. The maintenance operations (`retry_failed_items`,
//! `clear_failed_items`) are the exception and report storage errors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Notify};
use tokio::time::MissedTickBehavior;

use crate::action::{Action, ActionId};
use crate::cache::{Cache, CacheStats};
use crate::clock::{ClockSource, SystemClock};
use crate::config::EngineConfig;
use crate::connectivity::{ConnectivityMonitor, ConnectivitySnapshot, ListenerHandle, Transition};
use crate::error::Result;
use crate::handler::ActionHandler;
use crate::queue::{ActionQueue, DrainReport, QueueEvent, QueueStatus};
use crate::store::KeyValueStore;

/// Builder for [`ResilienceEngine`].
pub struct EngineBuilder<S, H> {
    store: Arc<S>,
    handler: H,
    clock: Arc<dyn ClockSource>,
    config: EngineConfig,
}

impl<S: KeyValueStore, H: ActionHandler> EngineBuilder<S, H> {
    /// Replaces the wall clock (tests use [`crate::ManualClock`]).
    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the config and loads the persisted queue.
    pub async fn build(self) -> Result<ResilienceEngine<S, H>> {
        self.config.validate()?;
        let queue = ActionQueue::load(Arc::clone(&self.store), Arc::clone(&self.clock), &self.config).await?;
        let cache = Cache::new(Arc::clone(&self.store), Arc::clone(&self.clock), &self.config);
        Ok(ResilienceEngine {
            store: self.store,
            clock: self.clock,
            handler: self.handler,
            monitor: ConnectivityMonitor::new(),
            cache,
            queue,
            config: self.config,
            watching: AtomicBool::new(false),
            drain_requested: Notify::new(),
        })
    }
}

/// Offline-first resilience layer: deferred writes, cached reads and
/// connectivity-driven replay.
pub struct ResilienceEngine<S, H> {
    config: EngineConfig,
    store: Arc<S>,
    clock: Arc<dyn ClockSource>,
    handler: H,
    monitor: ConnectivityMonitor,
    cache: Cache<S>,
    queue: ActionQueue<S>,
    /// Set while [`ResilienceEngine::watch_connectivity`] runs.
    watching: AtomicBool,
    drain_requested: Notify,
}

impl<S: KeyValueStore, H: ActionHandler> ResilienceEngine<S, H> {
    pub fn builder(store: Arc<S>, handler: H) -> EngineBuilder<S, H> {
        EngineBuilder { store, handler, clock: Arc::new(SystemClock), config: EngineConfig::default() }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    pub fn queue(&self) -> &ActionQueue<S> {
        &self.queue
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Startup replay: drains whatever a previous session left queued.
    ///
    /// For engines driven without a platform signal. When the signal is
    /// wired, [`watch_connectivity`](Self::watch_connectivity) replays on its
    /// own once the first reported state is applied, and calling `start`
    /// before that would attempt items while the device may be offline.
    pub async fn start(&self) -> DrainReport {
        let queued = self.queue.len();
        if queued > 0 {
            tracing::info!(queued, online = self.monitor.is_online(), "resuming persisted action queue");
        }
        self.drain().await
    }

    // -- queue --

    /// Queues `action` with the configured default retry limit.
    pub async fn queue_action(&self, action: Action) -> ActionId {
        self.queue_action_with_retries(action, None).await
    }

    /// Queues `action` and, when online, schedules a drain.
    ///
    /// Never fails. The returned id identifies the item in queue events.
    pub async fn queue_action_with_retries(&self, action: Action, max_retries: Option<u32>) -> ActionId {
        let id = self.queue.enqueue(action, max_retries).await;
        if self.monitor.is_online() {
            self.schedule_drain().await;
        }
        id
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.queue.status()
    }

    /// Resets exhausted items so they get a fresh set of retries, then drains
    /// if online.
    pub async fn retry_failed_items(&self) -> Result<usize> {
        let reset = self.queue.retry_failed().await?;
        if reset > 0 && self.monitor.is_online() {
            self.schedule_drain().await;
        }
        Ok(reset)
    }

    pub async fn clear_failed_items(&self) -> Result<usize> {
        self.queue.clear_failed().await
    }

    /// Per-item outcomes, including terminal drops.
    pub fn subscribe_events(&self) -> broadcast::Receiver<QueueEvent> {
        self.queue.subscribe()
    }

    /// Hands the drain to the running connectivity watcher, so the caller
    /// does not wait on remote calls. Without a watcher, drains inline.
    async fn schedule_drain(&self) {
        if self.watching.load(Ordering::SeqCst) {
            self.drain_requested.notify_one();
        } else {
            self.drain().await;
        }
    }

    /// Drains the queue unless offline. Concurrent calls coalesce.
    ///
    /// Connectivity is re-checked before every item; going offline mid-pass
    /// leaves the rest of the queue untouched.
    pub async fn drain(&self) -> DrainReport {
        if !self.monitor.is_online() {
            tracing::debug!("offline, not draining");
            return DrainReport::default();
        }
        self.queue.drain_while(&self.handler, &|| self.monitor.is_online()).await
    }

    // -- cache --

    pub async fn cache_data<T>(&self, key: &str, data: &T, ttl: Option<Duration>)
    where
        T: Serialize + ?Sized,
    {
        if let Err(e) = self.cache.set(key, data, ttl).await {
            tracing::warn!(key, "failed to cache data: {}", e);
        }
    }

    /// Cached value for `key`; misses, expiry and errors all read as `None`.
    pub async fn cached_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.get(key).await.unwrap_or_else(|e| {
            tracing::warn!(key, "failed to read cached data: {}", e);
            None
        })
    }

    pub async fn clear_cache(&self, key: Option<&str>) {
        match self.cache.clear(key).await {
            Ok(removed) => tracing::debug!(removed, "cleared cache"),
            Err(e) => tracing::warn!("failed to clear cache: {}", e),
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await.unwrap_or_else(|e| {
            tracing::warn!("failed to scan cache: {}", e);
            CacheStats::default()
        })
    }

    /// Runs one expired-entry sweep; returns how many entries were removed.
    pub async fn sweep_cache(&self) -> Result<usize> {
        self.cache.sweep().await
    }

    /// Sweeps the cache every `period`, forever. Run it as its own task
    /// when [`EngineConfig::sweep_interval`] is set.
    pub async fn run_sweeper(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.cache.sweep().await {
                tracing::warn!("cache sweep failed: {}", e);
            }
        }
    }

    // -- connectivity --

    pub fn connection_status(&self) -> bool {
        self.monitor.is_online()
    }

    pub fn add_connection_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.monitor.add_listener(listener)
    }

    /// Applies one platform connectivity report and drains inline when the
    /// device came online.
    ///
    /// For callers that report connectivity themselves. A wired signal goes
    /// through [`watch_connectivity`](Self::watch_connectivity) instead.
    pub async fn connectivity_changed(&self, online: bool) -> Option<Transition> {
        let transition = self.apply_report(online).await;
        if transition == Some(Transition::CameOnline) {
            self.drain().await;
        }
        transition
    }

    /// Updates the monitor (notifying listeners) and records the diagnostic
    /// snapshot. Never drains.
    async fn apply_report(&self, online: bool) -> Option<Transition> {
        let transition = self.monitor.report(online);

        let snapshot = ConnectivitySnapshot { is_online: online, observed_at: self.clock.now_ms() };
        if let Err(e) = snapshot.save(&*self.store, &self.config.connectivity_key()).await {
            tracing::warn!("failed to record connectivity snapshot: {}", e);
        }

        match transition {
            Some(Transition::CameOnline) => tracing::info!(queued = self.queue.len(), "connectivity restored"),
            Some(Transition::WentOffline) => tracing::info!("connectivity lost"),
            None => {}
        }
        transition
    }

    /// Follows the platform signal until its sender is dropped. Run it once,
    /// as its own task, before queueing actions.
    ///
    /// The current value is applied first, then the queue is replayed if the
    /// device is online, so a device that starts offline is marked offline
    /// before any queued action is attempted. While this runs, drains
    /// requested by [`queue_action`](Self::queue_action) and
    /// [`retry_failed_items`](Self::retry_failed_items) are performed here,
    /// and reports keep being applied while a drain is in flight.
    ///
    /// A second concurrent call returns immediately.
    pub async fn watch_connectivity(&self, mut signal: watch::Receiver<bool>) {
        let Some(_watching) = WatchGuard::acquire(&self.watching) else {
            tracing::warn!("connectivity signal is already being watched");
            return;
        };

        let online = *signal.borrow_and_update();
        self.apply_report(online).await;
        let mut pending = online;
        let mut drain = None;

        loop {
            if pending && drain.is_none() {
                pending = false;
                drain = Some(Box::pin(self.drain()));
            }

            let wake = tokio::select! {
                changed = signal.changed() => match changed {
                    Ok(()) => Wake::Report,
                    Err(_) => Wake::Closed,
                },
                () = self.drain_requested.notified() => Wake::DrainRequested,
                _ = async {
                    match drain.as_mut() {
                        Some(running) => running.await,
                        None => std::future::pending().await,
                    }
                }, if drain.is_some() => Wake::Drained,
            };

            match wake {
                Wake::Report => {
                    let online = *signal.borrow_and_update();
                    if self.apply_report(online).await == Some(Transition::CameOnline) {
                        pending = true;
                    }
                }
                Wake::DrainRequested => pending = true,
                Wake::Drained => drain = None,
                Wake::Closed => break,
            }
        }

        if let Some(running) = drain {
            running.await;
        }
        tracing::debug!("connectivity signal closed");
    }

    /// Last recorded connectivity state. Display only: after a restart it
    /// describes the previous session, not the device.
    pub async fn last_connectivity_snapshot(&self) -> Option<ConnectivitySnapshot> {
        ConnectivitySnapshot::load(&*self.store, &self.config.connectivity_key()).await.unwrap_or_else(|e| {
            tracing::warn!("failed to read connectivity snapshot: {}", e);
            None
        })
    }
}

/// What woke the connectivity watcher.
enum Wake {
    Report,
    DrainRequested,
    Drained,
    Closed,
}

/// Holds the watcher flag; releases it on drop.
struct WatchGuard<'a>(&'a AtomicBool);

impl<'a> WatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).ok().map(|_| WatchGuard(flag))
    }
}

impl Drop for WatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
