// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `swapq` pointed at `store`, isolated from the caller's environment.
pub fn swapq(store: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("swapq");
    cmd.env_remove("SWAPQ_STORE").env_remove("SWAPQ_LOG").arg("--store").arg(store.path());
    cmd
}

/// Queues a create-listing action and returns its id.
pub fn add_listing(store: &TempDir, title: &str, max_retries: u32) -> String {
    let action = format!(r#"{{"action_type":"create-listing","payload":{{"title":"{title}"}}}}"#);
    let output = swapq(store)
        .args(["queue", "add", &action, "--max-retries", &max_retries.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Writes a cache entry directly through the core library.
pub fn seed_cache(store: &TempDir, key: &str, value: serde_json::Value) {
    use std::sync::Arc;
    use swapq_core::{Cache, EngineConfig, FileStore, SystemClock};

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        let store = Arc::new(FileStore::open(store.path()).unwrap());
        let cache = Cache::new(store, Arc::new(SystemClock), &EngineConfig::default());
        cache.set(key, &value, None).await.unwrap();
    });
}
