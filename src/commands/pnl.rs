// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::IncomeSource;
use crate::commands::income::load;
use crate::config::Config;
use crate::pnl::{
    AccountMonthlyPnl, YearMonth, account_monthly_pnl, month_range, total_monthly_pnl,
};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(source, session, cfg, sub).await?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct MonthlyReport {
    month: YearMonth,
    total: Decimal,
    accounts: Vec<AccountMonthlyPnl>,
}

async fn monthly<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = match sub.get_one::<String>("month") {
        Some(raw) => parse_month(raw)?,
        None => YearMonth::current(cfg.timezone),
    };
    let range = month_range(month, cfg.timezone)?;
    let accounts = load(source, session, cfg).await?;
    let cards = account_monthly_pnl(&accounts, &range);
    let report = MonthlyReport {
        month,
        total: total_monthly_pnl(&cards),
        accounts: cards,
    };
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }
    if report.accounts.is_empty() {
        println!("No trade accounts.");
        return Ok(());
    }
    println!("Monthly PnL - {}", month.label());
    println!(
        "{}",
        pretty_table(&["Account", "Monthly PnL"], monthly_rows(&report.accounts, &report.total))
    );
    Ok(())
}

/// One row per account (errors shown in place of the amount) and a total row.
pub fn monthly_rows(cards: &[AccountMonthlyPnl], total: &Decimal) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = cards
        .iter()
        .map(|c| {
            let value = match &c.error {
                Some(e) => format!("error: {}", e),
                None => fmt_money(&c.monthly_pnl),
            };
            vec![c.account_name.clone(), value]
        })
        .collect();
    rows.push(vec!["Total".to_string(), fmt_money(total)]);
    rows
}
