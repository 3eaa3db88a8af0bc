// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking.
//!
//! [`ConnectivityMonitor`] holds the current reachability as reported by the
//! platform signal and fans state changes out to registered listeners. It is
//! purely in-memory: after a restart the state is re-derived from the
//! platform, never from storage.
//!
//! The monitor assumes the device is online until told otherwise.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Callback invoked with the new state on every change.
pub type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Direction of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Current connectivity plus change observers.
pub struct ConnectivityMonitor {
    online: AtomicBool,
    registry: Arc<Mutex<Registry>>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        ConnectivityMonitor { online: AtomicBool::new(true), registry: Arc::default() }
    }

    /// Last state reported by the platform (online until the first report).
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Registers `listener` for every subsequent state change.
    ///
    /// Listeners run synchronously, in registration order, inside
    /// [`report`](Self::report).
    pub fn add_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        ListenerHandle { id, registry: Arc::downgrade(&self.registry) }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    /// Applies a platform report.
    ///
    /// Returns `None` when the state did not change; otherwise notifies every
    /// listener and returns the transition.
    pub fn report(&self, online: bool) -> Option<Transition> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if was_online == online {
            return None;
        }

        // Clone out so listeners may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> =
            lock(&self.registry).listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener(online);
        }

        Some(if online { Transition::CameOnline } else { Transition::WentOffline })
    }
}

/// Removes its listener when [`unsubscribe`](Self::unsubscribe) is called.
#[must_use = "keep the handle to be able to unsubscribe the listener"]
pub struct ListenerHandle {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl ListenerHandle {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Diagnostic record of the last observed state.
///
/// Persisted for display only; it must never decide drain eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivitySnapshot {
    pub is_online: bool,
    /// Milliseconds since Unix epoch.
    pub observed_at: u64,
}

impl ConnectivitySnapshot {
    /// Reads the snapshot stored under `key`; an unreadable one reads as absent.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Option<Self>> {
        let Some(raw) = store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(key, "ignoring unreadable connectivity snapshot: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn save<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> Result<()> {
        store.set(key, serde_json::to_string(self)?).await
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
