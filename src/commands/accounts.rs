// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{BalanceSource, IncomeSource};
use crate::config::Config;
use crate::fetch::{AccountBalance, fetch_balances};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub async fn handle<S: IncomeSource + BalanceSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(source, session, cfg, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn list<S: IncomeSource + BalanceSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let accounts = source
        .fetch_accounts(session)
        .await
        .context("Failed to load trade accounts")?;

    if !sub.get_flag("balances") {
        if maybe_print_json(json_flag, jsonl_flag, &accounts)? {
            return Ok(());
        }
        let data = accounts
            .iter()
            .map(|a| vec![a.name.clone(), a.id.clone(), a.provider.to_string()])
            .collect();
        println!("{}", pretty_table(&["Name", "Id", "Provider"], data));
        return Ok(());
    }

    let balances = fetch_balances(source, session, &accounts, cfg.request_timeout()).await;
    if maybe_print_json(json_flag, jsonl_flag, &balances)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Name", "Id", "Provider", "Balance", "Available", "Unrealized PnL"],
            balance_rows(&balances)
        )
    );
    Ok(())
}

/// Accounts whose balance failed to load still get a row.
pub fn balance_rows(balances: &[AccountBalance]) -> Vec<Vec<String>> {
    balances
        .iter()
        .map(|b| {
            let mut row = vec![
                b.account.name.clone(),
                b.account.id.clone(),
                b.account.provider.to_string(),
            ];
            match (&b.balance, &b.error) {
                (Some(bal), _) => row.extend([
                    format!("{} {}", fmt_money(&bal.balance), bal.asset),
                    fmt_money(&bal.available_balance),
                    fmt_money(&bal.cross_un_pnl),
                ]),
                (None, err) => row.extend([
                    format!("error: {}", err.as_deref().unwrap_or("unavailable")),
                    "-".to_string(),
                    "-".to_string(),
                ]),
            }
            row
        })
        .collect()
}
