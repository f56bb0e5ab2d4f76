// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pnlclip::{api::ApiClient, cli, commands, config, session::Session};

/// Logs go to stderr so `--json` output stays clean. Level via `RUST_LOG`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let matches = cli::build_cli().get_matches();

    if let Some(("config", sub)) = matches.subcommand() {
        let path = config::config_path()?;
        let mut cfg = config::load_from(&path)?;
        return commands::config::handle(&mut cfg, &path, sub);
    }

    let cfg = config::load()?;
    let client = ApiClient::from_config(&cfg)?;
    let session = Session::from_config(&cfg);

    match matches.subcommand() {
        Some(("accounts", sub)) => commands::accounts::handle(&client, &session, &cfg, sub).await?,
        Some(("account", sub)) => commands::account::handle(&client, &session, &cfg, sub).await?,
        Some(("income", sub)) => commands::income::handle(&client, &session, &cfg, sub).await?,
        Some(("pnl", sub)) => commands::pnl::handle(&client, &session, &cfg, sub).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
