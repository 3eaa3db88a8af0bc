// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use swapq_core::{CacheStats, ConnectivitySnapshot, QueueStatus};

use super::cache::format_stats;
use super::connectivity::format_snapshot;
use super::{plural, render, Context};
use crate::cli::OutputFormat;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct StatusReport {
    queue: QueueStatus,
    cache: CacheStats,
    connectivity: Option<ConnectivitySnapshot>,
}

pub async fn run(ctx: &Context, format: OutputFormat) -> Result<String> {
    let report = StatusReport {
        queue: ctx.queue().await?.status(),
        cache: ctx.cache().stats().await?,
        connectivity: ctx.connectivity().await?,
    };
    render(format, &report, format_report)
}

fn format_report(report: &StatusReport) -> String {
    let q = &report.queue;
    format!(
        "queue:        {} ({} pending, {} failed)\ncache:        {}\nconnectivity: {}",
        plural(q.total_items, "action", "actions"),
        q.pending_items,
        q.failed_items,
        format_stats(&report.cache),
        format_snapshot(report.connectivity.as_ref())
    )
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
