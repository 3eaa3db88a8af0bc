// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! swapq-core: Offline resilience layer for the swap marketplace client
//!
//! This crate provides the durable action queue, the TTL read cache and the
//! connectivity monitor, composed by [`ResilienceEngine`]. Storage and the
//! backend client are injected through [`KeyValueStore`] and [`ActionHandler`].

pub mod action;
pub mod cache;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod handler;
pub mod queue;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use action::{Action, ActionId, ListingDraft, MessageDraft, QueuedAction, QueuedPayload, SwapRequestDraft};
pub use cache::{Cache, CacheStats};
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use connectivity::{ConnectivityMonitor, ConnectivitySnapshot, ListenerHandle, Transition};
pub use engine::{EngineBuilder, ResilienceEngine};
pub use error::{Error, Result};
pub use handler::{ActionHandler, HandlerError, HandlerFuture, HandlerResult};
pub use queue::{ActionQueue, DrainReport, DropReason, QueueEvent, QueueStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
