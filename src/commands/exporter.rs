// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{
    AccumulatedPoint, DailyAggregate, account_names, build_accumulated_series,
    build_daily_aggregate,
};
use crate::api::IncomeSource;
use crate::commands::income::load;
use crate::config::Config;
use crate::session::Session;
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(anyhow!("Unknown format: {} (use csv|json)", other)),
        }
    }
}

pub async fn handle<S: IncomeSource>(
    source: &S,
    session: &Session,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = Format::parse(sub.get_one::<String>("format").map(String::as_str).unwrap_or(""))?;
    let out = sub
        .get_one::<String>("out")
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow!("--out is required"))?;
    let view = sub
        .get_one::<String>("view")
        .map(String::as_str)
        .unwrap_or("daily");

    let accounts = load(source, session, cfg).await?;
    let names = account_names(&accounts);
    let path = Path::new(&out);
    match view {
        "series" => {
            let series = build_accumulated_series(&accounts, cfg.timezone);
            write_series(path, fmt, &names, &series)?;
        }
        _ => {
            let daily = build_daily_aggregate(&accounts, cfg.timezone);
            write_daily(path, fmt, &names, &daily)?;
        }
    }
    println!("Exported {} income to {}", view, out);
    Ok(())
}

/// One row per day, oldest first. Accounts without income that day are
/// written as 0 in CSV and omitted in JSON.
pub fn write_daily(
    path: &Path,
    fmt: Format,
    names: &[String],
    rows: &[DailyAggregate],
) -> Result<()> {
    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(path)?;
            let mut header = vec!["date".to_string()];
            header.extend(names.iter().cloned());
            header.push("total".to_string());
            wtr.write_record(&header)?;
            for row in rows {
                let mut rec = vec![row.date.to_string()];
                rec.extend(names.iter().map(|n| {
                    row.income_by_account
                        .get(n)
                        .copied()
                        .unwrap_or(Decimal::ZERO)
                        .to_string()
                }));
                rec.push(row.total_income.to_string());
                wtr.write_record(&rec)?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "date": r.date.to_string(),
                        "income_by_account": r.income_by_account,
                        "total_income": r.total_income,
                    })
                })
                .collect();
            std::fs::write(path, serde_json::to_string_pretty(&items)?)?;
        }
    }
    Ok(())
}

pub fn write_series(
    path: &Path,
    fmt: Format,
    names: &[String],
    series: &[AccumulatedPoint],
) -> Result<()> {
    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(path)?;
            let mut header = vec!["date".to_string()];
            header.extend(names.iter().cloned());
            header.push("total".to_string());
            wtr.write_record(&header)?;
            for p in series {
                let mut rec = vec![p.date.to_string()];
                rec.extend(names.iter().map(|n| {
                    p.value_by_account
                        .get(n)
                        .copied()
                        .unwrap_or(Decimal::ZERO)
                        .to_string()
                }));
                rec.push(p.total.to_string());
                wtr.write_record(&rec)?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(path, serde_json::to_string_pretty(series)?)?;
        }
    }
    Ok(())
}
