// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.
//!
//! Each command returns the text to print so it can be tested without
//! capturing stdout.

pub mod cache;
pub mod connectivity;
pub mod queue;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use chrono::DateTime;
use serde::Serialize;
use swapq_core::{
    ActionQueue, Cache, ClockSource, ConnectivitySnapshot, EngineConfig, FileStore, SystemClock,
};

use crate::cli::OutputFormat;
use crate::error::Result;

/// An opened store plus the engine settings used to address it.
pub struct Context {
    store: Arc<FileStore>,
    config: EngineConfig,
    clock: Arc<dyn ClockSource>,
}

impl Context {
    pub fn open(dir: &Path, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = FileStore::open(dir)?;
        tracing::debug!("opened store at {}", dir.display());
        Ok(Context { store: Arc::new(store), config, clock: Arc::new(SystemClock) })
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    #[cfg(test)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn queue(&self) -> Result<ActionQueue<FileStore>> {
        Ok(ActionQueue::load(Arc::clone(&self.store), Arc::clone(&self.clock), &self.config).await?)
    }

    pub fn cache(&self) -> Cache<FileStore> {
        Cache::new(Arc::clone(&self.store), Arc::clone(&self.clock), &self.config)
    }

    pub async fn connectivity(&self) -> Result<Option<ConnectivitySnapshot>> {
        Ok(ConnectivitySnapshot::load(&*self.store, &self.config.connectivity_key()).await?)
    }
}

/// Renders `value` as pretty JSON, or with `text` otherwise.
fn render<T, F>(format: OutputFormat, value: &T, text: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(text(value)),
    }
}

/// Formats milliseconds since Unix epoch as a UTC timestamp.
fn format_ms(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// `1 entry`, `2 entries`.
fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
