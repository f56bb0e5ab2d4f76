// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pnlclip::api::{ApiError, IncomeSource};
use pnlclip::config::Config;
use pnlclip::models::{Account, IncomeRecord, IncomeType, Provider};
use pnlclip::session::Session;
use pnlclip::tz::DayZone;
use pnlclip::{cli, commands::exporter};
use tempfile::tempdir;

const MAR_1: i64 = 1_740_787_200_000;

struct TwoAccounts;

fn record(time: i64, income: &str) -> IncomeRecord {
    IncomeRecord {
        symbol: "BTCUSDT".into(),
        income_type: IncomeType::RealizedPnl,
        income: income.into(),
        asset: "USDT".into(),
        info: String::new(),
        time,
        tran_id: time.to_string(),
        trade_id: String::new(),
    }
}

impl IncomeSource for TwoAccounts {
    async fn fetch_accounts(&self, _session: &Session) -> Result<Vec<Account>, ApiError> {
        Ok(vec![
            Account {
                id: "1".into(),
                name: "Main".into(),
                provider: Provider::Binance,
            },
            Account {
                id: "2".into(),
                name: "Hedge".into(),
                provider: Provider::Bybit,
            },
        ])
    }

    async fn fetch_income(
        &self,
        _session: &Session,
        account_id: &str,
    ) -> Result<Vec<IncomeRecord>, ApiError> {
        Ok(match account_id {
            "1" => vec![record(MAR_1 + 1_000, "1.5"), record(MAR_1 + 2 * 86_400_000, "2")],
            _ => vec![record(MAR_1 + 86_400_000, "-0.5")],
        })
    }
}

fn utc_config() -> Config {
    Config {
        timezone: DayZone::Utc,
        ..Config::default()
    }
}

async fn run_export(args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pnlclip", "income", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, income) = matches.subcommand().unwrap();
    let (_, export) = income.subcommand().unwrap();
    exporter::handle(
        &TwoAccounts,
        &Session::new(Some("t".into())),
        &utc_config(),
        export,
    )
    .await
}

#[tokio::test]
async fn daily_csv_has_a_column_per_account() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("daily.csv");
    let out_str = out.to_string_lossy().to_string();
    run_export(&["--format", "csv", "--out", &out_str])
        .await
        .unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["date", "Main", "Hedge", "total"]);
    let rows: Vec<Vec<String>> = rdr
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["2025-03-01", "1.5", "0", "1.5"]);
    assert_eq!(rows[1], vec!["2025-03-02", "0", "-0.5", "-0.5"]);
}

#[tokio::test]
async fn series_json_carries_values_forward() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("series.json");
    let out_str = out.to_string_lossy().to_string();
    run_export(&["--view", "series", "--format", "json", "--out", &out_str])
        .await
        .unwrap();

    let data: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let points = data.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[1]["value_by_account"]["Main"], "1.5");
    assert_eq!(points[2]["value_by_account"]["Hedge"], "-0.5");
    assert_eq!(points[2]["total"], "3.0");
    assert_eq!(points[2]["display_date"], "Mar 03, 2025");
}

#[tokio::test]
async fn unknown_format_writes_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.xml");
    let out_str = out.to_string_lossy().to_string();
    let err = run_export(&["--format", "xml", "--out", &out_str])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}
