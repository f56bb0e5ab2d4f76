// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{IncomeEntry, ProfitPoint, checked_add, profit_series};
use crate::api::ApiClient;
use crate::config::Config;
use crate::session::Session;
use crate::tz::DayZone;
use crate::utils::{fmt_money, maybe_print_json, paginate, pretty_table, total_pages};
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

const TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn handle(
    client: &ApiClient,
    session: &Session,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(client, session, sub).await?,
        Some(("balance", sub)) => balance(client, session, sub).await?,
        Some(("positions", sub)) => positions(client, session, sub).await?,
        Some(("orders", sub)) => orders(client, session, cfg, sub).await?,
        Some(("trades", sub)) => trades(client, session, cfg, sub).await?,
        Some(("snapshots", sub)) => snapshots(client, session, cfg, sub).await?,
        Some(("income", sub)) => income(client, session, cfg, sub).await?,
        _ => {}
    }
    Ok(())
}

fn id_arg(sub: &clap::ArgMatches) -> Result<String> {
    sub.get_one::<String>("id")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("Account id is required")
}

async fn show(client: &ApiClient, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let account = client
        .trade_account(session, &id)
        .await
        .with_context(|| format!("Trade account {}", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &account)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Id".into(), account.id.clone()],
        vec!["Name".into(), account.name.clone()],
        vec!["Provider".into(), account.provider.to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

async fn balance(client: &ApiClient, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let bal = client
        .balance(session, &id)
        .await
        .with_context(|| format!("Balance for account {}", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bal)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Asset".into(), bal.asset.clone()],
        vec!["Total Balance".into(), fmt_money(&bal.balance)],
        vec!["Unrealized PnL".into(), fmt_money(&bal.cross_un_pnl)],
        vec!["Available".into(), fmt_money(&bal.available_balance)],
        vec!["Max Withdraw".into(), fmt_money(&bal.max_withdraw_amount)],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

async fn positions(client: &ApiClient, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let mut positions = client
        .current_positions(session, &id)
        .await
        .with_context(|| format!("Positions for account {}", id))?;
    positions.retain(|p| !p.position_amt.is_zero());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &positions)? {
        return Ok(());
    }
    let rows = positions
        .iter()
        .map(|p| {
            vec![
                p.symbol.clone(),
                p.position_side.clone(),
                p.position_amt.to_string(),
                p.entry_price.to_string(),
                p.mark_price.to_string(),
                fmt_money(&p.unrealized_profit),
                p.leverage.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Symbol", "Side", "Size", "Entry", "Mark", "uPnL", "Lev"],
            rows
        )
    );
    Ok(())
}

async fn orders(
    client: &ApiClient,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = id_arg(sub)?;
    let orders = client
        .open_orders(session, &id)
        .await
        .with_context(|| format!("Open orders for account {}", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &orders)? {
        return Ok(());
    }
    let rows = orders
        .iter()
        .map(|o| {
            vec![
                cfg.timezone.format_millis(o.time, TIME_FMT),
                o.symbol.clone(),
                o.side.clone(),
                o.r#type.clone(),
                o.price.to_string(),
                o.orig_qty.to_string(),
                o.executed_qty.to_string(),
                o.status.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Time", "Symbol", "Side", "Type", "Price", "Qty", "Filled", "Status"],
            rows
        )
    );
    Ok(())
}

async fn trades(
    client: &ApiClient,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = id_arg(sub)?;
    let symbol = sub
        .get_one::<String>("symbol")
        .map(|s| s.trim().to_uppercase())
        .context("--symbol is required")?;
    let mut trades = client
        .trade_history(session, &id, &symbol)
        .await
        .with_context(|| format!("Trade history for account {}", id))?;
    trades.sort_by(|a, b| b.time.cmp(&a.time));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trades)? {
        return Ok(());
    }
    let rows = trades
        .iter()
        .map(|t| {
            vec![
                cfg.timezone.format_millis(t.time, TIME_FMT),
                t.symbol.clone(),
                t.side.clone(),
                t.price.to_string(),
                t.qty.to_string(),
                format!("{} {}", t.commission, t.commission_asset),
                fmt_money(&t.realized_pnl),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Time", "Symbol", "Side", "Price", "Qty", "Fee", "Realized PnL"],
            rows
        )
    );
    Ok(())
}

async fn snapshots(
    client: &ApiClient,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = id_arg(sub)?;
    let days = *sub.get_one::<u32>("days").unwrap_or(&30);
    let end = Utc::now();
    let start = end - chrono::Duration::days(i64::from(days));
    let snaps = client
        .snapshots(session, &id, start.timestamp_millis(), end.timestamp_millis())
        .await
        .with_context(|| format!("Snapshots for account {}", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snaps)? {
        return Ok(());
    }
    let rows = snaps
        .iter()
        .map(|s| {
            vec![
                cfg.timezone.format_millis(s.time, "%Y-%m-%d"),
                fmt_money(&s.total_wallet_balance),
                fmt_money(&s.total_unrealized_profit),
                fmt_money(&s.total_margin_balance),
                fmt_money(&s.available_balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Wallet", "uPnL", "Margin Balance", "Available"],
            rows
        )
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct AccountLedger<'a> {
    entries: &'a [IncomeEntry],
    profit: Vec<ProfitPoint>,
}

async fn income(
    client: &ApiClient,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let id = id_arg(sub)?;
    let page = *sub.get_one::<usize>("page").unwrap_or(&1);
    let records = client
        .income(session, &id)
        .await
        .with_context(|| format!("Income for account {}", id))?;
    let entries: Vec<IncomeEntry> = records
        .into_iter()
        .map(|r| IncomeEntry::from_record(r, &id))
        .collect();
    let ledger = AccountLedger {
        profit: profit_series(&entries, cfg.timezone),
        entries: &entries,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ledger)? {
        return Ok(());
    }
    let rows = ledger_rows(&entries, cfg.timezone);
    if rows.is_empty() {
        println!("No income records.");
        return Ok(());
    }
    let pages = total_pages(rows.len(), cfg.rows_per_page);
    println!(
        "{}",
        pretty_table(
            &["Time", "Type", "Symbol", "Amount", "Asset", "Running PnL"],
            paginate(&rows, page, cfg.rows_per_page).to_vec()
        )
    );
    if pages > 1 {
        println!("Page {} of {}", page.max(1), pages);
    }
    Ok(())
}

/// Ledger rows newest first, each carrying the account's running total as of
/// that record.
pub fn ledger_rows(entries: &[IncomeEntry], zone: DayZone) -> Vec<Vec<String>> {
    let mut sorted: Vec<&IncomeEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.time);
    let mut running = Decimal::ZERO;
    let mut rows: Vec<Vec<String>> = sorted
        .into_iter()
        .map(|e| {
            running = checked_add(running, e.amount, &e.tran_id).unwrap_or(running);
            let sign = if e.amount.is_sign_negative() { "" } else { "+" };
            vec![
                zone.format_millis(e.time, TIME_FMT),
                e.income_type.to_string(),
                e.symbol.clone(),
                format!("{}{:.8}", sign, e.amount),
                e.asset.clone(),
                fmt_money(&running),
            ]
        })
        .collect();
    rows.reverse();
    rows
}
