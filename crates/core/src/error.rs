// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for swapq-core operations.

use thiserror::Error;

/// All errors surfaced by the store, cache and queue layers.
///
/// The engine facade catches and logs most of these; they reach callers
/// only through the lower-level component APIs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage key is not valid: '{0}'")]
    InvalidKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted queue blob: {0}")]
    CorruptedQueue(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A specialized Result type for swapq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
