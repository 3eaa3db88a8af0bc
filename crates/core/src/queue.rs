// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable FIFO of deferred writes.
//!
//! The live list is kept in memory and mirrored to a single store key as a
//! JSON array. Every mutation outside a drain persists immediately; a drain
//! pass persists once, after the whole snapshot has been walked.
//!
//! Drains are single-flight. A drain requested while another is running does
//! not start a second walk over the same items; it asks the running drainer
//! for one more pass and returns.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::action::{Action, ActionId, QueuedAction};
use crate::clock::ClockSource;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::handler::{dispatch, ActionHandler, HandlerError, HandlerResult};
use crate::store::KeyValueStore;

/// Events buffered per subscriber before the oldest are discarded.
const EVENT_CAPACITY: usize = 64;

/// Counts reported by [`ActionQueue::status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub total_items: usize,
    /// Items that may still be retried.
    pub pending_items: usize,
    /// Items whose next failure is terminal (`retry_count >= max_retries`).
    pub failed_items: usize,
}

/// What one call to [`ActionQueue::drain`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Handler invocations, across all passes.
    pub attempted: usize,
    pub succeeded: usize,
    /// Failures that left the item queued with one more retry spent.
    pub failed: usize,
    /// Failures that removed the item for good.
    pub dropped: usize,
    /// True when another drain was already running and took over this request.
    pub coalesced: bool,
}

/// Why an item left the queue without succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropReason {
    RetriesExhausted,
    /// The handler has no backend for this variant.
    Unsupported,
}

impl DropReason {
    fn for_error(error: &HandlerError) -> Self {
        match error {
            HandlerError::Unsupported(_) => DropReason::Unsupported,
            _ => DropReason::RetriesExhausted,
        }
    }
}

/// Per-item outcome broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Succeeded { id: ActionId, action_type: String },
    /// `attempt` is the 1-based number of the attempt that failed.
    Failed { id: ActionId, attempt: u32, error: HandlerError },
    /// Terminal failure; `action` is the item as it was removed.
    Dropped { action: QueuedAction, reason: DropReason, error: HandlerError },
}

/// The persistent action queue.
pub struct ActionQueue<S> {
    store: Arc<S>,
    clock: Arc<dyn ClockSource>,
    key: String,
    default_max_retries: u32,
    items: Mutex<Vec<QueuedAction>>,
    /// Serializes blob writes so an older snapshot never lands after a newer one.
    persist_lock: tokio::sync::Mutex<()>,
    draining: AtomicBool,
    rerun_requested: AtomicBool,
    events: broadcast::Sender<QueueEvent>,
}

impl<S: KeyValueStore> ActionQueue<S> {
    /// Loads the queue persisted under the configured key.
    ///
    /// A blob that is not a JSON array leaves the queue empty, and items that
    /// no longer deserialize are skipped. Either way the original blob is
    /// copied to `{key}.corrupt` before the next write replaces it. Only a
    /// failing store read is an error.
    pub async fn load(store: Arc<S>, clock: Arc<dyn ClockSource>, config: &EngineConfig) -> Result<Self> {
        let key = config.queue_key();
        let items = match store.get(&key).await? {
            None => Vec::new(),
            Some(raw) => match parse_items(&raw) {
                Ok(parsed) if parsed.skipped == 0 => parsed.items,
                Ok(parsed) => {
                    tracing::error!(key = %key, skipped = parsed.skipped, "action queue has unreadable items");
                    back_up(&*store, &key, raw).await;
                    parsed.items
                }
                Err(e) => {
                    tracing::error!(key = %key, "{}, starting empty", e);
                    back_up(&*store, &key, raw).await;
                    Vec::new()
                }
            },
        };
        if !items.is_empty() {
            tracing::debug!(items = items.len(), "loaded action queue");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(ActionQueue {
            store,
            clock,
            key,
            default_max_retries: config.default_max_retries,
            items: Mutex::new(items),
            persist_lock: tokio::sync::Mutex::new(()),
            draining: AtomicBool::new(false),
            rerun_requested: AtomicBool::new(false),
            events,
        })
    }

    /// Storage key of the persisted blob.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Appends `action` and persists the queue.
    ///
    /// Never fails: once the item is in memory it is queued, and a failed
    /// write is only logged (the next successful persist carries it).
    pub async fn enqueue(&self, action: Action, max_retries: Option<u32>) -> ActionId {
        let item = {
            let mut items = self.lock_items();
            let now = self.clock.now_ms();
            let id = ActionId::generate(now, |candidate| items.iter().any(|i| i.id.as_str() == candidate));
            let item = QueuedAction::new(id, action, now, max_retries.unwrap_or(self.default_max_retries));
            items.push(item.clone());
            item
        };
        tracing::debug!(
            id = %item.id,
            action_type = item.action.action_type(),
            max_retries = item.max_retries,
            "queued action"
        );

        if let Err(e) = self.persist().await {
            tracing::warn!("failed to persist action queue: {}", e);
        }
        item.id
    }

    /// Snapshot of the queued items in FIFO order.
    pub fn list(&self) -> Vec<QueuedAction> {
        self.lock_items().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    pub fn status(&self) -> QueueStatus {
        let items = self.lock_items();
        let failed_items = items.iter().filter(|i| i.is_exhausted()).count();
        QueueStatus { total_items: items.len(), pending_items: items.len() - failed_items, failed_items }
    }

    /// Resets `retry_count` on every exhausted item; returns how many.
    pub async fn retry_failed(&self) -> Result<usize> {
        let reset = {
            let mut items = self.lock_items();
            let mut reset = 0;
            for item in items.iter_mut().filter(|i| i.is_exhausted()) {
                item.retry_count = 0;
                reset += 1;
            }
            reset
        };
        if reset > 0 {
            tracing::info!(items = reset, "reset retries on failed actions");
            self.persist().await?;
        }
        Ok(reset)
    }

    /// Removes every exhausted item; returns how many.
    pub async fn clear_failed(&self) -> Result<usize> {
        let removed = {
            let mut items = self.lock_items();
            let before = items.len();
            items.retain(|i| !i.is_exhausted());
            before - items.len()
        };
        if removed > 0 {
            tracing::info!(items = removed, "cleared failed actions");
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Writes the current live list to the store.
    pub async fn persist(&self) -> Result<()> {
        let _write = self.persist_lock.lock().await;
        let raw = serde_json::to_string(&*self.lock_items())?;
        self.store.set(&self.key, raw).await
    }

    /// Drains unconditionally. See [`drain_while`](Self::drain_while).
    pub async fn drain<H: ActionHandler + ?Sized>(&self, handler: &H) -> DrainReport {
        self.drain_while(handler, &|| true).await
    }

    /// Walks the queue once (plus one pass per coalesced request), invoking
    /// `handler` for each item in FIFO order.
    ///
    /// `online` is checked before every pass and before every item; once it
    /// reports offline the remaining items are left as they are.
    pub async fn drain_while<H, F>(&self, handler: &H, online: &F) -> DrainReport
    where
        H: ActionHandler + ?Sized,
        F: Fn() -> bool + Sync,
    {
        let mut report = DrainReport::default();
        loop {
            let Some(guard) = DrainGuard::acquire(&self.draining) else {
                self.rerun_requested.store(true, Ordering::SeqCst);
                report.coalesced = true;
                tracing::debug!("drain already running, requested another pass");
                return report;
            };
            loop {
                self.rerun_requested.store(false, Ordering::SeqCst);
                if !online() {
                    break;
                }
                self.drain_pass(handler, online, &mut report).await;
                if !self.rerun_requested.load(Ordering::SeqCst) {
                    break;
                }
            }
            drop(guard);

            // A request may have landed between the last check and the release.
            if !self.rerun_requested.load(Ordering::SeqCst) || !online() {
                break;
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                succeeded = report.succeeded,
                failed = report.failed,
                dropped = report.dropped,
                remaining = self.len(),
                "drained action queue"
            );
        }
        report
    }

    async fn drain_pass<H, F>(&self, handler: &H, online: &F, report: &mut DrainReport)
    where
        H: ActionHandler + ?Sized,
        F: Fn() -> bool + Sync,
    {
        let snapshot = self.list();
        if snapshot.is_empty() {
            return;
        }

        for item in &snapshot {
            if !online() {
                tracing::debug!(id = %item.id, "went offline, stopping drain pass");
                break;
            }
            tracing::debug!(id = %item.id, action_type = item.action.action_type(), "executing action");
            report.attempted += 1;
            let result = dispatch(handler, &item.action).await;
            self.settle(item, result, report);
        }

        if let Err(e) = self.persist().await {
            tracing::warn!("failed to persist action queue after drain: {}", e);
        }
    }

    /// Applies one attempt's outcome to the live list.
    fn settle(&self, attempted: &QueuedAction, result: HandlerResult, report: &mut DrainReport) {
        let mut items = self.lock_items();
        let position = items.iter().position(|i| i.id == attempted.id);

        match (result, position) {
            (Ok(()), position) => {
                if let Some(pos) = position {
                    items.remove(pos);
                }
                report.succeeded += 1;
                self.emit(QueueEvent::Succeeded {
                    id: attempted.id.clone(),
                    action_type: attempted.action.action_type().to_string(),
                });
            }
            (Err(_), None) => {
                tracing::debug!(id = %attempted.id, "action left the queue during its attempt");
            }
            (Err(error), Some(pos)) if items[pos].is_exhausted() => {
                let action = items.remove(pos);
                report.dropped += 1;
                tracing::error!(
                    id = %action.id,
                    action_type = action.action.action_type(),
                    attempts = action.retry_count + 1,
                    "dropping action: {}",
                    error
                );
                let reason = DropReason::for_error(&error);
                self.emit(QueueEvent::Dropped { action, reason, error });
            }
            (Err(error), Some(pos)) => {
                let item = &mut items[pos];
                item.retry_count += 1;
                report.failed += 1;
                tracing::warn!(
                    id = %item.id,
                    action_type = item.action.action_type(),
                    attempt = item.retry_count,
                    max_retries = item.max_retries,
                    "action failed: {}",
                    error
                );
                let event = QueueEvent::Failed { id: item.id.clone(), attempt: item.retry_count, error };
                self.emit(event);
            }
        }
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_items(&self) -> MutexGuard<'_, Vec<QueuedAction>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct ParsedItems {
    items: Vec<QueuedAction>,
    skipped: usize,
}

/// Parses the persisted blob, skipping items that no longer deserialize.
fn parse_items(raw: &str) -> Result<ParsedItems> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| Error::CorruptedQueue(e.to_string()))?;
    let mut parsed = ParsedItems { items: Vec::with_capacity(values.len()), skipped: 0 };
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<QueuedAction>(value) {
            Ok(mut item) => {
                if item.retry_count > item.max_retries {
                    tracing::warn!(id = %item.id, "clamping retry_count to max_retries");
                    item.retry_count = item.max_retries;
                }
                parsed.items.push(item);
            }
            Err(e) => {
                tracing::error!(index, "skipping unreadable queued action: {}", e);
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

/// Copies the unreadable blob to `{key}.corrupt`.
async fn back_up<S: KeyValueStore + ?Sized>(store: &S, key: &str, raw: String) {
    let backup = format!("{}.corrupt", key);
    match store.set(&backup, raw).await {
        Ok(()) => tracing::warn!(key = %backup, "backed up unreadable action queue"),
        Err(e) => tracing::warn!(key = %backup, "failed to back up unreadable queue: {}", e),
    }
}

/// Holds the single-flight flag; releases it on drop.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).ok().map(|_| DrainGuard(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
