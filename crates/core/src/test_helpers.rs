// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::action::{ListingDraft, SwapRequestDraft};
use crate::handler::{ActionHandler, HandlerError, HandlerFuture, HandlerResult};
use crate::store::{KeyValueStore, MemoryStore, StoreFuture};

#[derive(Default)]
struct HandlerState {
    calls: Vec<String>,
    script: VecDeque<HandlerResult>,
    fail_all: bool,
}

/// Records every call as `"{action-type}:{identity}"`.
///
/// Results come from the script first, then default to success (or failure
/// for [`failing`](Self::failing)). `send_message` keeps the trait default.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    state: Arc<Mutex<HandlerState>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let handler = Self::default();
        handler.state.lock().unwrap().fail_all = true;
        handler
    }

    /// Every call is recorded, then waits for one permit from `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        RecordingHandler { gate: Some(gate), ..Self::default() }
    }

    pub fn script(self, results: Vec<HandlerResult>) -> Self {
        self.state.lock().unwrap().script.extend(results);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, label: String) -> HandlerFuture<'_> {
        Box::pin(async move {
            self.state.lock().unwrap().calls.push(label);
            if let Some(gate) = &self.gate {
                gate.acquire().await.map_err(HandlerError::remote)?.forget();
            }
            let mut state = self.state.lock().unwrap();
            match state.script.pop_front() {
                Some(result) => result,
                None if state.fail_all => Err(HandlerError::remote("backend unavailable")),
                None => Ok(()),
            }
        })
    }
}

impl ActionHandler for RecordingHandler {
    fn create_listing<'a>(&'a self, draft: &'a ListingDraft) -> HandlerFuture<'a> {
        self.record(format!("create-listing:{}", draft.title))
    }

    fn create_swap_request<'a>(&'a self, draft: &'a SwapRequestDraft) -> HandlerFuture<'a> {
        self.record(format!("create-swap-request:{}", draft.listing_id))
    }
}

/// [`MemoryStore`] that counts writes per key.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    writes: Arc<Mutex<HashMap<String, usize>>>,
}

impl CountingStore {
    pub fn writes(&self, key: &str) -> usize {
        self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

impl KeyValueStore for CountingStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        self.inner.get(key)
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        *self.writes.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.set(key, value)
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> StoreFuture<'_, Vec<String>> {
        self.inner.keys()
    }
}
