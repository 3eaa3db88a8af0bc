// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `SWAPQ_STORE` if set and non-empty.
pub fn store_dir() -> Option<PathBuf> {
    std::env::var_os(vars::SWAPQ_STORE).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the value of `SWAPQ_LOG` (an `EnvFilter` directive) if set.
pub fn log_filter() -> Option<String> {
    std::env::var(vars::SWAPQ_LOG).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
