// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn vars_constants() {
    assert_eq!(vars::FERRY_CONFIG, "FERRY_CONFIG");
    assert_eq!(vars::FERRY_STATE_DIR, "FERRY_STATE_DIR");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

#[test]
fn state_dir_set_and_unset() {
    std::env::set_var(vars::FERRY_STATE_DIR, "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));

    std::env::set_var(vars::FERRY_STATE_DIR, "");
    assert_eq!(state_dir(), None);

    std::env::remove_var(vars::FERRY_STATE_DIR);
    assert_eq!(state_dir(), None);
}

#[test]
fn config_path_set_and_unset() {
    std::env::set_var(vars::FERRY_CONFIG, "/etc/ferry.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/etc/ferry.toml")));

    std::env::set_var(vars::FERRY_CONFIG, "");
    assert_eq!(config_path(), None);

    std::env::remove_var(vars::FERRY_CONFIG);
    assert_eq!(config_path(), None);
}

#[test]
fn log_filter_ignores_empty_value() {
    let saved = std::env::var(vars::RUST_LOG).ok();

    std::env::set_var(vars::RUST_LOG, "ferry=debug");
    assert_eq!(log_filter().as_deref(), Some("ferry=debug"));

    std::env::set_var(vars::RUST_LOG, "");
    assert_eq!(log_filter(), None);

    match saved {
        Some(value) => std::env::set_var(vars::RUST_LOG, value),
        None => std::env::remove_var(vars::RUST_LOG),
    }
}
