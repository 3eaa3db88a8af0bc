// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TTL cache for previously fetched reads.
//!
//! Entries live in the persistent store under `{namespace}{key}`, wrapped in
//! an envelope recording when they were cached and for how long they stay
//! valid. Expiry is lazy: a stale entry is deleted the next time it is read,
//! or when a namespace scan ([`Cache::stats`], [`Cache::sweep`]) walks over it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::ClockSource;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::store::KeyValueStore;

/// Persisted form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope<T> {
    data: T,
    /// Milliseconds since Unix epoch.
    cached_at: u64,
    /// Validity window in milliseconds. Signed so foreign writers can store
    /// a negative TTL, which is simply already expired.
    ttl_ms: i64,
}

impl<T> CacheEnvelope<T> {
    /// Valid iff `now - cached_at <= ttl`.
    fn is_expired(&self, now_ms: u64) -> bool {
        let age = i128::from(now_ms) - i128::from(self.cached_at);
        age > i128::from(self.ttl_ms)
    }
}

/// Summary of the cache namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_items: usize,
    /// Approximate: sum of serialized entry lengths.
    pub total_size: usize,
    /// `cached_at` of the oldest live entry.
    pub oldest_item: Option<u64>,
    /// `cached_at` of the newest live entry.
    pub newest_item: Option<u64>,
}

/// Namespaced TTL cache over a [`KeyValueStore`].
pub struct Cache<S> {
    store: Arc<S>,
    clock: Arc<dyn ClockSource>,
    namespace: String,
    default_ttl: Duration,
}

struct ScanOutcome {
    stats: CacheStats,
    evicted: usize,
}

impl<S: KeyValueStore> Cache<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn ClockSource>, config: &EngineConfig) -> Self {
        Cache {
            store,
            clock,
            namespace: config.cache_namespace(),
            default_ttl: config.default_cache_ttl(),
        }
    }

    /// The key prefix every entry is stored under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Caches `data` under `key` for `ttl` (the configured default when `None`).
    ///
    /// The TTL is not validated; a zero TTL expires as soon as the clock moves.
    pub async fn set<T>(&self, key: &str, data: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let envelope = CacheEnvelope {
            data,
            cached_at: self.clock.now_ms(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        };
        let raw = serde_json::to_string(&envelope)?;
        self.store.set(&self.storage_key(key), raw).await
    }

    /// Returns the cached value, or `None` if it was never cached or has expired.
    ///
    /// Expired and unreadable envelopes are deleted. A readable envelope whose
    /// data does not deserialize as `T` is left in place and reported as an error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let storage_key = self.storage_key(key);
        let Some(raw) = self.store.get(&storage_key).await? else {
            return Ok(None);
        };

        let envelope: CacheEnvelope<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key, "discarding unreadable cache entry: {}", e);
                self.store.remove(&storage_key).await?;
                return Ok(None);
            }
        };

        if envelope.is_expired(self.clock.now_ms()) {
            tracing::debug!(key, "cache entry expired");
            self.store.remove(&storage_key).await?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(envelope.data)?))
    }

    /// Removes one entry, or every entry in the namespace when `key` is `None`.
    ///
    /// Keys outside the namespace (the action queue, other apps) are never
    /// touched. Returns how many keys were removed.
    pub async fn clear(&self, key: Option<&str>) -> Result<usize> {
        if let Some(key) = key {
            let storage_key = self.storage_key(key);
            let existed = self.store.get(&storage_key).await?.is_some();
            self.store.remove(&storage_key).await?;
            return Ok(usize::from(existed));
        }

        let mut removed = 0;
        for storage_key in self.namespaced_keys().await? {
            self.store.remove(&storage_key).await?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Scans the namespace, evicting stale entries, and summarizes the rest.
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(self.scan().await?.stats)
    }

    /// Deletes every expired or unreadable entry; returns how many were removed.
    pub async fn sweep(&self) -> Result<usize> {
        let outcome = self.scan().await?;
        if outcome.evicted > 0 {
            tracing::info!(evicted = outcome.evicted, "cache sweep reclaimed entries");
        }
        Ok(outcome.evicted)
    }

    async fn namespaced_keys(&self) -> Result<Vec<String>> {
        let mut keys = self.store.keys().await?;
        keys.retain(|k| k.starts_with(&self.namespace));
        Ok(keys)
    }

    async fn scan(&self) -> Result<ScanOutcome> {
        let now = self.clock.now_ms();
        let mut stats = CacheStats::default();
        let mut evicted = 0;

        for storage_key in self.namespaced_keys().await? {
            let Some(raw) = self.store.get(&storage_key).await? else {
                continue;
            };
            let live = match serde_json::from_str::<CacheEnvelope<serde_json::Value>>(&raw) {
                Ok(envelope) if !envelope.is_expired(now) => Some(envelope.cached_at),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(key = %storage_key, "discarding unreadable cache entry: {}", e);
                    None
                }
            };

            match live {
                Some(cached_at) => {
                    stats.total_items += 1;
                    stats.total_size += raw.len();
                    stats.oldest_item = Some(stats.oldest_item.map_or(cached_at, |o| o.min(cached_at)));
                    stats.newest_item = Some(stats.newest_item.map_or(cached_at, |n| n.max(cached_at)));
                }
                None => {
                    self.store.remove(&storage_key).await?;
                    evicted += 1;
                }
            }
        }

        Ok(ScanOutcome { stats, evicted })
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
