// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use swapq_core::CacheStats;

use super::{format_ms, plural, render, Context};
use crate::cli::OutputFormat;
use crate::error::{Error, Result};

pub async fn stats(ctx: &Context, format: OutputFormat) -> Result<String> {
    let stats = ctx.cache().stats().await?;
    render(format, &stats, format_stats)
}

/// Prints the cached value as pretty JSON. Expired entries are evicted and
/// reported as missing, the same as a read through the engine.
pub async fn get(ctx: &Context, key: &str) -> Result<String> {
    match ctx.cache().get::<serde_json::Value>(key).await? {
        Some(value) => Ok(serde_json::to_string_pretty(&value)?),
        None => Err(Error::NotCached(key.to_string())),
    }
}

pub async fn clear(ctx: &Context, key: Option<&str>) -> Result<String> {
    let removed = ctx.cache().clear(key).await?;
    Ok(format!("removed {}", plural(removed, "cache entry", "cache entries")))
}

pub async fn sweep(ctx: &Context) -> Result<String> {
    let evicted = ctx.cache().sweep().await?;
    Ok(format!("swept {}", plural(evicted, "stale entry", "stale entries")))
}

pub(super) fn format_stats(stats: &CacheStats) -> String {
    let mut text = format!("{}, {} bytes", plural(stats.total_items, "entry", "entries"), stats.total_size);
    if let (Some(oldest), Some(newest)) = (stats.oldest_item, stats.newest_item) {
        text.push_str(&format!(", cached {} .. {}", format_ms(oldest), format_ms(newest)));
    }
    text
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
