// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::tz::DayZone;
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Pnlclip", "pnlclip"));

pub const ENV_API_URL: &str = "PNLCLIP_API_URL";
pub const ENV_API_KEY: &str = "PNLCLIP_API_KEY";
pub const ENV_TOKEN: &str = "PNLCLIP_TOKEN";
pub const ENV_TZ: &str = "PNLCLIP_TZ";

pub const KEYS: [&str; 6] = [
    "api_url",
    "api_key",
    "access_token",
    "timezone",
    "request_timeout_secs",
    "rows_per_page",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub timezone: DayZone,
    pub request_timeout_secs: u64,
    pub rows_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:8000".to_string(),
            api_key: None,
            access_token: None,
            timezone: DayZone::Local,
            request_timeout_secs: 15,
            rows_per_page: 10,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Validate and assign one key. Empty values clear optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "api_url" => {
                reqwest::Url::parse(value)
                    .with_context(|| format!("Invalid api_url '{}'", value))?;
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "api_key" => self.api_key = optional(value),
            "access_token" => self.access_token = optional(value),
            "timezone" => self.timezone = value.parse()?,
            "request_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout '{}'", value))?;
                if secs == 0 {
                    return Err(anyhow!("request_timeout_secs must be at least 1"));
                }
                self.request_timeout_secs = secs;
            }
            "rows_per_page" => {
                self.rows_per_page = value
                    .parse()
                    .with_context(|| format!("Invalid rows_per_page '{}'", value))?;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown config key '{}' (expected one of {})",
                    key,
                    KEYS.join(", ")
                ));
            }
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in [
            (ENV_API_URL, "api_url"),
            (ENV_API_KEY, "api_key"),
            (ENV_TOKEN, "access_token"),
            (ENV_TZ, "timezone"),
        ] {
            if let Some(v) = lookup(var) {
                self.set(key, &v).with_context(|| format!("From ${}", var))?;
            }
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Key/value pairs for display, with secrets masked.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        let mask = |v: &Option<String>| match v {
            Some(s) if s.chars().count() > 8 => {
                let tail: String = s.chars().skip(s.chars().count() - 4).collect();
                format!("****{}", tail)
            }
            Some(_) => "****".to_string(),
            None => "(unset)".to_string(),
        };
        vec![
            vec!["api_url".into(), self.api_url.clone()],
            vec!["api_key".into(), mask(&self.api_key)],
            vec!["access_token".into(), mask(&self.access_token)],
            vec!["timezone".into(), self.timezone.to_string()],
            vec![
                "request_timeout_secs".into(),
                self.request_timeout_secs.to_string(),
            ],
            vec!["rows_per_page".into(), self.rows_per_page.to_string()],
        ]
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("config.json"))
}

/// Read the config file at `path`; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read config at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse config at {}", path.display()))
}

pub fn save_to(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config dir")?;
    }
    fs::write(path, serde_json::to_string_pretty(cfg)?)
        .with_context(|| format!("Write config at {}", path.display()))
}

/// Config file merged with environment overrides.
pub fn load() -> Result<Config> {
    let mut cfg = load_from(&config_path()?)?;
    cfg.apply_env()?;
    Ok(cfg)
}
