// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Config, save_to};
use crate::utils::pretty_table;
use anyhow::Result;
use std::path::Path;

/// `cfg` must be the file contents only, without environment overrides,
/// so that `set` never persists a value that came from the environment.
pub fn handle(cfg: &mut Config, path: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            println!("{}", pretty_table(&["Key", "Value"], cfg.display_rows()));
        }
        Some(("path", _)) => println!("{}", path.display()),
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").map(|s| s.trim()).unwrap_or("");
            let value = sub.get_one::<String>("value").map(String::as_str).unwrap_or("");
            cfg.set(key, value)?;
            save_to(cfg, path)?;
            println!("Set {} in {}", key, path.display());
        }
        _ => {}
    }
    Ok(())
}
