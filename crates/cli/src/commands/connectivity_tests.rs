// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use swapq_core::EngineConfig;
use tempfile::TempDir;

#[tokio::test]
async fn nothing_recorded() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::open(temp.path(), EngineConfig::default()).unwrap();

    assert_eq!(show(&ctx, OutputFormat::Text).await.unwrap(), "no connectivity recorded");
    assert_eq!(show(&ctx, OutputFormat::Json).await.unwrap(), "null");
}

#[tokio::test]
async fn recorded_snapshot_is_labelled_stale() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::open(temp.path(), EngineConfig::default()).unwrap();
    let snapshot = ConnectivitySnapshot { is_online: false, observed_at: 1_767_225_600_000 };
    snapshot.save(ctx.store(), &ctx.config().connectivity_key()).await.unwrap();

    assert_eq!(
        show(&ctx, OutputFormat::Text).await.unwrap(),
        "offline as of 2026-01-01 00:00:00 UTC (last observation, not live)"
    );
}
