// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    epoch = { 0, "1970-01-01 00:00:00 UTC" },
    new_year = { 1_767_225_600_000, "2026-01-01 00:00:00 UTC" },
    sub_second = { 1_767_225_601_999, "2026-01-01 00:00:01 UTC" },
)]
fn format_ms_renders_utc(ms: u64, expected: &str) {
    assert_eq!(format_ms(ms), expected);
}

#[test]
fn format_ms_falls_back_to_raw_number() {
    assert_eq!(format_ms(u64::MAX), u64::MAX.to_string());
}

#[parameterized(
    zero = { 0, "0 items" },
    one = { 1, "1 item" },
    many = { 5, "5 items" },
)]
fn plural_picks_form(count: usize, expected: &str) {
    assert_eq!(plural(count, "item", "items"), expected);
}

#[test]
fn open_rejects_invalid_engine_config() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = EngineConfig { key_prefix: String::new(), ..EngineConfig::default() };

    assert!(Context::open(temp.path(), config).is_err());
}
