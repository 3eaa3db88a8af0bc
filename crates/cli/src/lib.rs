// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sqcli - operator CLI for the swapq resilience store.
//!
//! This crate backs the `swapq` binary, which opens a file-backed store and
//! inspects or maintains what the client application persisted there.
//!
//! # Main Components
//!
//! - [`Cli`] - command-line definition
//! - [`Config`] - optional TOML config (store location, engine settings)
//! - [`Error`] - error types for all operations
//!
//! The CLI has no backend client, so it never drains the queue.

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;

pub use cli::{CacheCommand, Cli, Command, OutputFormat, QueueCommand};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Resolves config and store, then runs `cli.command`, printing its output.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let store_dir = config.resolve_store_dir(cli.store.as_deref(), env::store_dir())?;
    let ctx = Context::open(&store_dir, config.engine)?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let output = runtime.block_on(execute(&ctx, cli.command))?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

async fn execute(ctx: &Context, command: Command) -> Result<String> {
    match command {
        Command::Status { output } => commands::status::run(ctx, output).await,
        Command::Connectivity { output } => commands::connectivity::show(ctx, output).await,
        Command::Queue(cmd) => match cmd {
            QueueCommand::List { output } => commands::queue::list(ctx, output).await,
            QueueCommand::Add { action, max_retries } => commands::queue::add(ctx, &action, max_retries).await,
            QueueCommand::RetryFailed => commands::queue::retry_failed(ctx).await,
            QueueCommand::ClearFailed => commands::queue::clear_failed(ctx).await,
        },
        Command::Cache(cmd) => match cmd {
            CacheCommand::Stats { output } => commands::cache::stats(ctx, output).await,
            CacheCommand::Get { key } => commands::cache::get(ctx, &key).await,
            CacheCommand::Clear { key } => commands::cache::clear(ctx, key.as_deref()).await,
            CacheCommand::Sweep => commands::cache::sweep(ctx).await,
        },
    }
}
