// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pnlclip::aggregate::{
    AccountIncome, IncomeEntry, Order, account_names, account_totals, build_accumulated_series,
    build_daily_aggregate, sort_daily,
};
use pnlclip::cli;
use pnlclip::commands::account::ledger_rows;
use pnlclip::commands::income::{daily_table_rows, series_rows};
use pnlclip::models::{Account, IncomeType, Provider};
use pnlclip::tz::DayZone;
use rust_decimal::Decimal;

const MAR_1: i64 = 1_740_787_200_000;

fn entry(time: i64, income_type: IncomeType, amount: Decimal) -> IncomeEntry {
    IncomeEntry {
        symbol: "BTCUSDT".into(),
        income_type,
        amount,
        asset: "USDT".into(),
        time,
        tran_id: time.to_string(),
    }
}

fn accounts() -> Vec<AccountIncome> {
    vec![
        AccountIncome {
            account: Account {
                id: "1".into(),
                name: "Main".into(),
                provider: Provider::Binance,
            },
            entries: vec![
                entry(MAR_1, IncomeType::RealizedPnl, Decimal::new(1234, 2)),
                entry(MAR_1 + 86_400_000, IncomeType::Commission, Decimal::new(-5, 1)),
            ],
            error: None,
        },
        AccountIncome {
            account: Account {
                id: "2".into(),
                name: "Alt".into(),
                provider: Provider::Okex,
            },
            entries: vec![entry(MAR_1 + 60_000, IncomeType::FundingFee, Decimal::new(3, 0))],
            error: None,
        },
    ]
}

#[test]
fn daily_rows_newest_first_with_footer() {
    let accounts = accounts();
    let names = account_names(&accounts);
    let mut daily = build_daily_aggregate(&accounts, DayZone::Utc);
    sort_daily(&mut daily, Order::NewestFirst);
    let totals = account_totals(&accounts, &daily);
    let rows = daily_table_rows(&names, &daily, &totals);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["Mar 02, 2025", "-0.50", "-", "-0.50"]);
    assert_eq!(rows[1], vec!["Mar 01, 2025", "12.34", "3.00", "15.34"]);
    assert_eq!(rows[2], vec!["Total", "11.84", "3.00", "14.84"]);
}

#[test]
fn series_rows_follow_column_order() {
    let accounts = accounts();
    let names = account_names(&accounts);
    let rows = series_rows(&names, &build_accumulated_series(&accounts, DayZone::Utc));
    assert_eq!(rows[1], vec!["Mar 02, 2025", "11.84", "3.00", "14.84"]);
}

#[test]
fn ledger_rows_show_running_pnl() {
    let accounts = accounts();
    let rows = ledger_rows(&accounts[0].entries, DayZone::Utc);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "2025-03-02 00:00:00");
    assert_eq!(rows[0][3], "-0.50000000");
    assert_eq!(rows[0][5], "11.84");
    assert_eq!(rows[1][3], "+12.34000000");
    assert_eq!(rows[1][5], "12.34");
}

#[test]
fn income_table_args_parse() {
    let m = cli::build_cli().get_matches_from([
        "pnlclip", "income", "table", "--type", "REALIZED_PNL", "--type", "FUNDING_FEE", "--page",
        "2", "--json",
    ]);
    let (name, income) = m.subcommand().unwrap();
    assert_eq!(name, "income");
    let (name, table) = income.subcommand().unwrap();
    assert_eq!(name, "table");
    let types: Vec<&String> = table.get_many::<String>("type").unwrap().collect();
    assert_eq!(types.len(), 2);
    assert_eq!(*table.get_one::<usize>("page").unwrap(), 2);
    assert!(table.get_flag("json"));
}

#[test]
fn json_and_jsonl_conflict() {
    let res = cli::build_cli().try_get_matches_from([
        "pnlclip", "pnl", "monthly", "--json", "--jsonl",
    ]);
    assert!(res.is_err());
}
