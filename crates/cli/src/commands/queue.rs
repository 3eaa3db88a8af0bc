// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use swapq_core::{Action, QueuedAction};

use super::{format_ms, plural, render, Context};
use crate::cli::OutputFormat;
use crate::error::{Error, Result};

pub async fn list(ctx: &Context, format: OutputFormat) -> Result<String> {
    let items = ctx.queue().await?.list();
    render(format, &items, |items| format_items(items))
}

/// Parses `raw` as an action and queues it without draining.
pub async fn add(ctx: &Context, raw: &str, max_retries: Option<u32>) -> Result<String> {
    let action: Action = serde_json::from_str(raw).map_err(|e| Error::InvalidAction(e.to_string()))?;
    let queue = ctx.queue().await?;
    let id = queue.enqueue(action, max_retries).await;
    // enqueue only logs storage failures; the CLI must not report success then.
    queue.persist().await?;
    Ok(id.to_string())
}

pub async fn retry_failed(ctx: &Context) -> Result<String> {
    let reset = ctx.queue().await?.retry_failed().await?;
    Ok(format!("reset retries on {}", plural(reset, "action", "actions")))
}

pub async fn clear_failed(ctx: &Context) -> Result<String> {
    let removed = ctx.queue().await?.clear_failed().await?;
    Ok(format!("removed {}", plural(removed, "failed action", "failed actions")))
}

fn format_items(items: &[QueuedAction]) -> String {
    if items.is_empty() {
        return "queue is empty".to_string();
    }
    items.iter().map(format_item).collect::<Vec<_>>().join("\n")
}

fn format_item(item: &QueuedAction) -> String {
    let mut line = format!(
        "{}  {:<20} retries {}/{}  queued {}",
        item.id,
        item.action.action_type(),
        item.retry_count,
        item.max_retries,
        format_ms(item.enqueued_at)
    );
    if item.is_exhausted() {
        line.push_str("  [failed]");
    }
    line
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
