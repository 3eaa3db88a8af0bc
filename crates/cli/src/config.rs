// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration.
//!
//! An optional TOML file, by default `<config dir>/swapq/config.toml`:
//!
//! ```toml
//! store_dir = "/var/lib/swapq"
//!
//! [engine]
//! default_max_retries = 5
//! key_prefix = "@swapq/"
//! ```
//!
//! The store directory is resolved as `--store`, then `SWAPQ_STORE`, then
//! `store_dir`, then `<data dir>/swapq`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use swapq_core::EngineConfig;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "swapq";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of the CLI config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory backing the file store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Loads `path`, or the default config file if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::read(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|source| Error::InvalidConfig { path: path.to_path_buf(), source })?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Picks the store directory by precedence.
    pub fn resolve_store_dir(&self, flag: Option<&Path>, env: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = env {
            return Ok(dir);
        }
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir().map(|d| d.join(APP_DIR_NAME)).ok_or(Error::NoDataDir)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
