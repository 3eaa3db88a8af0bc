// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use swapq_core::ConnectivitySnapshot;

use super::{format_ms, render, Context};
use crate::cli::OutputFormat;
use crate::error::Result;

pub async fn show(ctx: &Context, format: OutputFormat) -> Result<String> {
    let snapshot = ctx.connectivity().await?;
    render(format, &snapshot, |s| format_snapshot(s.as_ref()))
}

/// The snapshot only says what the app last saw; the app re-reads the
/// platform signal on start and never consults it.
pub(super) fn format_snapshot(snapshot: Option<&ConnectivitySnapshot>) -> String {
    match snapshot {
        None => "no connectivity recorded".to_string(),
        Some(s) => format!(
            "{} as of {} (last observation, not live)",
            if s.is_online { "online" } else { "offline" },
            format_ms(s.observed_at)
        ),
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
