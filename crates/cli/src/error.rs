// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the `swapq` CLI.
///
/// Messages carry a hint where the fix is not obvious from the error alone.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config file {}: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot determine a data directory\n  hint: pass --store <dir> or set SWAPQ_STORE")]
    NoDataDir,

    #[error("invalid action: {0}\n  hint: expected {{\"action_type\": \"create-listing\", \"payload\": {{...}}}}")]
    InvalidAction(String),

    #[error("no cached entry for '{0}'")]
    NotCached(String),

    #[error(transparent)]
    Core(#[from] swapq_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for sqcli operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
