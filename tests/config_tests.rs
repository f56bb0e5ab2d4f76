// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pnlclip::config::{Config, ENV_TOKEN, ENV_TZ, load_from, save_to};
use pnlclip::tz::DayZone;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let cfg = load_from(&dir.path().join("nope.json")).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.timezone, DayZone::Local);
    assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
}

#[test]
fn set_then_save_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut cfg = Config::default();
    cfg.set("api_url", "https://api.example.com/").unwrap();
    cfg.set("timezone", "-05:30").unwrap();
    cfg.set("request_timeout_secs", "3").unwrap();
    cfg.set("access_token", "abc").unwrap();
    save_to(&cfg, &path).unwrap();

    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.api_url, "https://api.example.com");
    assert_eq!(loaded.timezone.to_string(), "-05:30");

    cfg.set("access_token", "  ").unwrap();
    assert_eq!(cfg.access_token, None);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"timezone":"utc","rows_per_page":25}"#).unwrap();
    let cfg = load_from(&path).unwrap();
    assert_eq!(cfg.timezone, DayZone::Utc);
    assert_eq!(cfg.rows_per_page, 25);
    assert_eq!(cfg.api_url, Config::default().api_url);
}

#[test]
fn rejects_bad_keys_and_values() {
    let mut cfg = Config::default();
    assert!(cfg.set("colour", "blue").is_err());
    assert!(cfg.set("timezone", "Mars/Olympus").is_err());
    assert!(cfg.set("request_timeout_secs", "0").is_err());
    assert!(cfg.set("rows_per_page", "many").is_err());
    assert!(cfg.set("api_url", "not a url").is_err());
    assert_eq!(cfg, Config::default());
}

#[test]
fn environment_overrides_file_values() {
    let mut cfg = Config::default();
    cfg.apply_env_with(|var| match var {
        v if v == ENV_TZ => Some("utc".to_string()),
        v if v == ENV_TOKEN => Some("from-env".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.timezone, DayZone::Utc);
    assert_eq!(cfg.access_token.as_deref(), Some("from-env"));

    let err = Config::default()
        .apply_env_with(|var| (var == ENV_TZ).then(|| "nowhere".to_string()))
        .unwrap_err();
    assert!(format!("{:#}", err).contains(ENV_TZ));
}

#[test]
fn display_masks_secrets() {
    let mut cfg = Config::default();
    cfg.set("api_key", "sk-1234567890").unwrap();
    let rows = cfg.display_rows();
    let key = rows.iter().find(|r| r[0] == "api_key").unwrap();
    assert_eq!(key[1], "****7890");
    let token = rows.iter().find(|r| r[0] == "access_token").unwrap();
    assert_eq!(token[1], "(unset)");
}
