// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "swapq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and maintain the offline action queue and read cache")]
#[command(
    long_about = "Inspect and maintain the offline action queue and read cache.\n\n\
    Operates on a file-backed store. Queued actions are never sent from here: \
    the client application drains them when it is online."
)]
pub struct Cli {
    /// Store directory (default: $SWAPQ_STORE, then config, then the user data dir)
    #[arg(long, global = true, value_name = "dir")]
    pub store: Option<PathBuf>,

    /// Config file (default: <config dir>/swapq/config.toml)
    #[arg(long, global = true, value_name = "file")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show queue counts, cache stats and the last connectivity snapshot
    Status {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Inspect or maintain the action queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Inspect or maintain the read cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Show the last recorded connectivity state
    Connectivity {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queued actions in replay order
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue an action without sending it
    #[command(after_help = "\
Examples:
  swapq queue add '{\"action_type\":\"create-listing\",\"payload\":{\"title\":\"Chair\"}}'
  swapq queue add '{\"action_type\":\"create-swap-request\",\"payload\":{\"listing_id\":\"lst-1\"}}' --max-retries 5")]
    Add {
        /// Action as JSON: {"action_type": ..., "payload": {...}}
        #[arg(value_parser = non_empty_string)]
        action: String,

        /// Retries allowed after the first attempt (default: engine config)
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Give exhausted actions a fresh set of retries
    RetryFailed,

    /// Remove exhausted actions
    ClearFailed,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Show entry count, size and age range
    Stats {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print a cached value as JSON
    Get {
        #[arg(value_parser = non_empty_string)]
        key: String,
    },

    /// Remove one entry, or every entry when no key is given
    Clear { key: Option<String> },

    /// Remove expired and unreadable entries
    Sweep,
}
