// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, content).unwrap();
    (temp, path)
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound(p) if p == missing));
}

#[test]
fn empty_file_gives_defaults() {
    let (_temp, path) = write_config("");

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.engine.default_max_retries, 3);
}

#[test]
fn engine_table_overrides_selected_fields() {
    let (_temp, path) = write_config(
        r#"
store_dir = "/srv/swapq"

[engine]
default_max_retries = 7
sweep_interval_secs = 300
"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.store_dir, Some(PathBuf::from("/srv/swapq")));
    assert_eq!(config.engine.default_max_retries, 7);
    assert_eq!(config.engine.sweep_interval_secs, Some(300));
    assert_eq!(config.engine.key_prefix, "@swapq/");
}

#[test]
fn malformed_toml_names_the_file() {
    let (_temp, path) = write_config("store_dir = [");

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn invalid_engine_values_are_rejected() {
    let (_temp, path) = write_config("[engine]\nkey_prefix = \"\"\n");

    assert!(matches!(Config::load(Some(&path)), Err(Error::Core(_))));
}

#[test]
fn store_dir_precedence() {
    let config = Config { store_dir: Some(PathBuf::from("/from/config")), ..Config::default() };

    let flag = config
        .resolve_store_dir(Some(Path::new("/from/flag")), Some(PathBuf::from("/from/env")))
        .unwrap();
    assert_eq!(flag, PathBuf::from("/from/flag"));

    let env = config.resolve_store_dir(None, Some(PathBuf::from("/from/env"))).unwrap();
    assert_eq!(env, PathBuf::from("/from/env"));

    let file = config.resolve_store_dir(None, None).unwrap();
    assert_eq!(file, PathBuf::from("/from/config"));
}
