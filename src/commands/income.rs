// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{
    AccountIncome, AccountTotals, AccumulatedPoint, DailyAggregate, Order, account_names,
    account_totals, build_accumulated_series, build_daily_aggregate, display_date,
    filter_income_types, sort_daily,
};
use crate::api::IncomeSource;
use crate::commands::exporter;
use crate::config::Config;
use crate::fetch::fetch_accounts_with_income;
use crate::models::IncomeType;
use crate::pnl::{CalendarMonth, YearMonth, calendar_month};
use crate::session::Session;
use crate::utils::{
    fmt_cell, fmt_money, maybe_print_json, paginate, parse_month, pretty_table, total_pages,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("table", sub)) => table(source, session, cfg, sub).await?,
        Some(("chart", sub)) => chart(source, session, cfg, sub).await?,
        Some(("calendar", sub)) => calendar(source, session, cfg, sub).await?,
        Some(("export", sub)) => exporter::handle(source, session, cfg, sub).await?,
        _ => {}
    }
    Ok(())
}

/// Fetch every account's income, reporting the accounts that failed.
pub async fn load<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
) -> Result<Vec<AccountIncome>> {
    let accounts = fetch_accounts_with_income(source, session, cfg.request_timeout())
        .await
        .context("Failed to load account income data")?;
    for a in accounts.iter().filter(|a| a.error.is_some()) {
        eprintln!(
            "warning: income for '{}' unavailable: {}",
            a.name(),
            a.error.as_deref().unwrap_or_default()
        );
    }
    Ok(accounts)
}

#[derive(Debug, Serialize)]
struct TablePage<'a> {
    page: usize,
    total_pages: usize,
    rows: &'a [DailyAggregate],
    totals: &'a AccountTotals,
}

async fn table<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = *sub.get_one::<usize>("page").unwrap_or(&1);
    let per_page = sub
        .get_one::<usize>("rows")
        .copied()
        .unwrap_or(cfg.rows_per_page);
    let types: Vec<IncomeType> = sub
        .get_many::<String>("type")
        .map(|vals| vals.map(|v| IncomeType::from(v.clone())).collect())
        .unwrap_or_default();

    let accounts = filter_income_types(&load(source, session, cfg).await?, &types);
    let mut daily = build_daily_aggregate(&accounts, cfg.timezone);
    sort_daily(&mut daily, Order::NewestFirst);
    let totals = account_totals(&accounts, &daily);
    let pages = total_pages(daily.len(), per_page);
    let rows = paginate(&daily, page, per_page);

    let out = TablePage {
        page,
        total_pages: pages,
        rows,
        totals: &totals,
    };
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }
    if daily.is_empty() {
        println!("No income data available from any accounts.");
        return Ok(());
    }
    let names = account_names(&accounts);
    let mut headers = vec!["Date".to_string()];
    headers.extend(names.iter().cloned());
    headers.push("Daily Total".to_string());
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    println!(
        "{}",
        pretty_table(&headers, daily_table_rows(&names, rows, &totals))
    );
    if pages > 1 {
        println!("Page {} of {}", page.max(1), pages);
    }
    Ok(())
}

/// Table body plus the totals footer. Days where an account had no income
/// show "-".
pub fn daily_table_rows(
    names: &[String],
    rows: &[DailyAggregate],
    totals: &AccountTotals,
) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(rows.len() + 1);
    for row in rows {
        let mut r = vec![display_date(row.date)];
        r.extend(names.iter().map(|n| fmt_cell(row.income_by_account.get(n))));
        r.push(fmt_money(&row.total_income));
        out.push(r);
    }
    let mut footer = vec!["Total".to_string()];
    footer.extend(
        names
            .iter()
            .map(|n| fmt_money(totals.by_account.get(n).unwrap_or(&Decimal::ZERO))),
    );
    footer.push(fmt_money(&totals.overall));
    out.push(footer);
    out
}

async fn chart<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let accounts = load(source, session, cfg).await?;
    let series = build_accumulated_series(&accounts, cfg.timezone);
    if maybe_print_json(json_flag, jsonl_flag, &series)? {
        return Ok(());
    }
    if series.is_empty() {
        println!("No income data available from any accounts.");
        return Ok(());
    }
    let names = account_names(&accounts);
    let mut headers = vec!["Date".to_string()];
    headers.extend(names.iter().cloned());
    headers.push("Total".to_string());
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    println!("{}", pretty_table(&headers, series_rows(&names, &series)));
    Ok(())
}

pub fn series_rows(names: &[String], series: &[AccumulatedPoint]) -> Vec<Vec<String>> {
    series
        .iter()
        .map(|p| {
            let mut r = vec![p.display_date.clone()];
            r.extend(
                names
                    .iter()
                    .map(|n| fmt_money(p.value_by_account.get(n).unwrap_or(&Decimal::ZERO))),
            );
            r.push(fmt_money(&p.total));
            r
        })
        .collect()
}

async fn calendar<S: IncomeSource>(
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
    let accounts = load(source, session, cfg).await?;
    let daily = build_daily_aggregate(&accounts, cfg.timezone);
    let cal = calendar_month(&daily, month);
    if maybe_print_json(json_flag, jsonl_flag, &cal)? {
        return Ok(());
    }
    println!("Trading Calendar - {}", month.label());
    println!(
        "{}",
        pretty_table(
            &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            calendar_grid(&cal)
        )
    );
    Ok(())
}

/// Sunday-first week rows. Each cell holds the day number, the day's total
/// and the non-zero per-account amounts.
pub fn calendar_grid(cal: &CalendarMonth) -> Vec<Vec<String>> {
    let mut cells: Vec<String> = vec![String::new(); cal.leading_blanks as usize];
    for day in &cal.days {
        let mut cell = day.date.format("%-d").to_string();
        if day.has_income {
            cell.push_str(&format!("  {}", fmt_money(&day.total_income)));
            for (name, v) in day.income_by_account.iter().filter(|(_, v)| !v.is_zero()) {
                cell.push_str(&format!("\n{}: {}", name, fmt_money(v)));
            }
        }
        cells.push(cell);
    }
    while cells.len() % 7 != 0 {
        cells.push(String::new());
    }
    cells.chunks(7).map(|week| week.to_vec()).collect()
}
