// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! All fields have defaults so an empty `[engine]` table (or none at all)
//! yields a working engine. Storage keys are derived from `key_prefix`:
//!
//! - `{prefix}action_queue` - the serialized action queue
//! - `{prefix}cache/<key>` - one entry per cached item
//! - `{prefix}connectivity` - diagnostic connectivity snapshot

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Tunables for the resilience engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Retries granted to actions enqueued without an explicit limit (default: 3).
    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,
    /// TTL for cache writes that don't specify one, in seconds (default: 24h).
    #[serde(default = "default_cache_ttl_secs")]
    pub default_cache_ttl_secs: u64,
    /// Prefix for every storage key the engine owns (default: "@swapq/").
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Period of the optional expired-entry sweep, in seconds. Unset = lazy only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_key_prefix() -> String {
    "@swapq/".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_max_retries: default_max_retries(),
            default_cache_ttl_secs: default_cache_ttl_secs(),
            key_prefix: default_key_prefix(),
            sweep_interval_secs: None,
        }
    }
}

impl EngineConfig {
    /// Checks the values that would otherwise break key derivation or the sweeper.
    pub fn validate(&self) -> Result<()> {
        if self.key_prefix.trim().is_empty() {
            return Err(Error::InvalidConfig("key_prefix cannot be empty".to_string()));
        }
        if self.sweep_interval_secs == Some(0) {
            return Err(Error::InvalidConfig(
                "sweep_interval_secs must be positive (omit it to disable sweeping)".to_string(),
            ));
        }
        Ok(())
    }

    /// Storage key holding the serialized action queue.
    pub fn queue_key(&self) -> String {
        format!("{}action_queue", self.key_prefix)
    }

    /// Prefix shared by every cache entry key.
    pub fn cache_namespace(&self) -> String {
        format!("{}cache/", self.key_prefix)
    }

    /// Storage key holding the last observed connectivity state.
    pub fn connectivity_key(&self) -> String {
        format!("{}connectivity", self.key_prefix)
    }

    pub fn default_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.default_cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
