// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-account income aggregation.
//!
//! Everything here is a pure function of the fetched records: the daily
//! breakdown that feeds the combined table and calendar, and the cumulative
//! series that feeds the chart. Account maps are ordered by name so the
//! output does not depend on the order the accounts were fetched in.

use crate::models::{Account, IncomeRecord, IncomeType};
use crate::tz::DayZone;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// An income record with its amount parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeEntry {
    pub symbol: String,
    pub income_type: IncomeType,
    pub amount: Decimal,
    pub asset: String,
    pub time: i64,
    pub tran_id: String,
}

impl IncomeEntry {
    /// Malformed amounts contribute zero instead of failing the whole account.
    pub fn from_record(record: IncomeRecord, account: &str) -> Self {
        let amount = match record.income.trim().parse::<Decimal>() {
            Ok(d) => d,
            Err(err) => {
                warn!(
                    account,
                    tran_id = %record.tran_id,
                    income = %record.income,
                    error = %err,
                    "unparseable income amount, counting as zero"
                );
                Decimal::ZERO
            }
        };
        IncomeEntry {
            symbol: record.symbol,
            income_type: record.income_type,
            amount,
            asset: record.asset,
            time: record.time,
            tran_id: record.tran_id,
        }
    }
}

/// Income of one account, or the reason it could not be fetched.
#[derive(Debug, Clone, Serialize)]
pub struct AccountIncome {
    pub account: Account,
    pub entries: Vec<IncomeEntry>,
    pub error: Option<String>,
}

impl AccountIncome {
    pub fn from_records(account: Account, records: Vec<IncomeRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|r| IncomeEntry::from_record(r, &account.name))
            .collect();
        AccountIncome {
            account,
            entries,
            error: None,
        }
    }

    pub fn failed(account: Account, error: impl Into<String>) -> Self {
        AccountIncome {
            account,
            entries: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.account.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    OldestFirst,
    NewestFirst,
}

/// Income per account on a single calendar day. Accounts without records on
/// the day have no key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub income_by_account: BTreeMap<String, Decimal>,
    pub total_income: Decimal,
}

/// Cumulative income per account as of the end of `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccumulatedPoint {
    pub date: NaiveDate,
    pub display_date: String,
    pub value_by_account: BTreeMap<String, Decimal>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTotals {
    pub by_account: BTreeMap<String, Decimal>,
    pub overall: Decimal,
}

/// Running profit of a single account, one point per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitPoint {
    pub time: i64,
    pub date: NaiveDate,
    pub accumulated: Decimal,
}

/// Account names in input order, without duplicates. Used for column order.
pub fn account_names(accounts: &[AccountIncome]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    accounts
        .iter()
        .filter(|a| seen.insert(a.name()))
        .map(|a| a.name().to_string())
        .collect()
}

/// Keep only entries of the given types. An empty list keeps everything.
pub fn filter_income_types(accounts: &[AccountIncome], types: &[IncomeType]) -> Vec<AccountIncome> {
    if types.is_empty() {
        return accounts.to_vec();
    }
    accounts
        .iter()
        .map(|a| AccountIncome {
            account: a.account.clone(),
            entries: a
                .entries
                .iter()
                .filter(|e| types.contains(&e.income_type))
                .cloned()
                .collect(),
            error: a.error.clone(),
        })
        .collect()
}

/// Group income by calendar day and account. Rows come back oldest first;
/// use [`sort_daily`] for the other direction.
pub fn build_daily_aggregate(accounts: &[AccountIncome], zone: DayZone) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    for account in accounts {
        for entry in &account.entries {
            let Some(date) = bucket(zone, entry, account.name()) else {
                continue;
            };
            let row = by_date.entry(date).or_insert_with(|| DailyAggregate {
                date,
                income_by_account: BTreeMap::new(),
                total_income: Decimal::ZERO,
            });
            let slot = row
                .income_by_account
                .entry(account.name().to_string())
                .or_insert(Decimal::ZERO);
            // Both sums move together so the row total stays the sum of its cells.
            let (Some(cell), Some(total)) = (
                checked_add(*slot, entry.amount, account.name()),
                checked_add(row.total_income, entry.amount, account.name()),
            ) else {
                continue;
            };
            *slot = cell;
            row.total_income = total;
        }
    }
    by_date.into_values().collect()
}

pub fn sort_daily(rows: &mut [DailyAggregate], order: Order) {
    match order {
        Order::OldestFirst => rows.sort_by_key(|r| r.date),
        Order::NewestFirst => rows.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}

/// Column totals for the daily table. Every account appears, even with no
/// income at all.
pub fn account_totals(accounts: &[AccountIncome], daily: &[DailyAggregate]) -> AccountTotals {
    let mut by_account: BTreeMap<String, Decimal> = accounts
        .iter()
        .map(|a| (a.name().to_string(), Decimal::ZERO))
        .collect();
    for row in daily {
        for (name, income) in &row.income_by_account {
            let slot = by_account.entry(name.clone()).or_insert(Decimal::ZERO);
            if let Some(sum) = checked_add(*slot, *income, name) {
                *slot = sum;
            }
        }
    }
    let overall = sum_amounts(by_account.values().copied(), "account totals");
    AccountTotals {
        by_account,
        overall,
    }
}

/// Cumulative income per account on a shared date axis.
///
/// The axis is every day on which any account has a record. An account
/// without activity on a day holds its last cumulative value; before its
/// first record it is zero. `total` is the sum of the held values, so it is
/// cumulative too.
pub fn build_accumulated_series(accounts: &[AccountIncome], zone: DayZone) -> Vec<AccumulatedPoint> {
    // Accounts sharing a name are charted as one line.
    let mut entries_by_name: BTreeMap<&str, Vec<&IncomeEntry>> = BTreeMap::new();
    for account in accounts {
        entries_by_name
            .entry(account.name())
            .or_default()
            .extend(account.entries.iter());
    }

    let mut axis: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut history: BTreeMap<&str, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();
    for (name, mut entries) in entries_by_name {
        entries.sort_by_key(|e| e.time);
        let closes = history.entry(name).or_default();
        let mut running = Decimal::ZERO;
        for entry in entries {
            let Some(date) = bucket(zone, entry, name) else {
                continue;
            };
            let Some(next) = checked_add(running, entry.amount, name) else {
                continue;
            };
            running = next;
            closes.insert(date, running);
            axis.insert(date);
        }
    }

    axis.into_iter()
        .map(|date| {
            let mut total = Decimal::ZERO;
            let mut value_by_account = BTreeMap::new();
            for (name, closes) in &history {
                let value = closes
                    .range(..=date)
                    .next_back()
                    .map(|(_, v)| *v)
                    .unwrap_or(Decimal::ZERO);
                if let Some(sum) = checked_add(total, value, name) {
                    total = sum;
                }
                value_by_account.insert(name.to_string(), value);
            }
            AccumulatedPoint {
                date,
                display_date: display_date(date),
                value_by_account,
                total,
            }
        })
        .collect()
}

/// Running sum over one account's records in time order.
pub fn profit_series(entries: &[IncomeEntry], zone: DayZone) -> Vec<ProfitPoint> {
    let mut sorted: Vec<&IncomeEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.time);
    let mut accumulated = Decimal::ZERO;
    sorted
        .into_iter()
        .filter_map(|e| {
            let date = zone.date_of(e.time)?;
            accumulated = checked_add(accumulated, e.amount, "profit series")?;
            Some(ProfitPoint {
                time: e.time,
                date,
                accumulated,
            })
        })
        .collect()
}

/// `acc + amount`, or `None` with a warning when the sum would leave
/// `Decimal`'s range. Callers skip the amount in that case.
pub fn checked_add(acc: Decimal, amount: Decimal, context: &str) -> Option<Decimal> {
    let sum = acc.checked_add(amount);
    if sum.is_none() {
        warn!(context, %acc, %amount, "decimal overflow, amount skipped");
    }
    sum
}

/// Sum that skips any amount that would overflow.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>, context: &str) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        checked_add(acc, amount, context).unwrap_or(acc)
    })
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

fn bucket(zone: DayZone, entry: &IncomeEntry, account: &str) -> Option<NaiveDate> {
    let date = zone.date_of(entry.time);
    if date.is_none() {
        warn!(account, time = entry.time, tran_id = %entry.tran_id, "income timestamp out of range, skipped");
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    fn entry(time: i64, amount: &str) -> IncomeEntry {
        IncomeEntry {
            symbol: "BTCUSDT".into(),
            income_type: IncomeType::RealizedPnl,
            amount: amount.parse().unwrap(),
            asset: "USDT".into(),
            time,
            tran_id: time.to_string(),
        }
    }

    fn account(name: &str) -> Account {
        Account {
            id: name.to_lowercase(),
            name: name.into(),
            provider: Provider::Binance,
        }
    }

    #[test]
    fn malformed_amount_counts_as_zero() {
        let rec = IncomeRecord {
            symbol: "X".into(),
            income_type: IncomeType::FundingFee,
            income: "1.2.3".into(),
            asset: "USDT".into(),
            info: String::new(),
            time: 0,
            tran_id: "7".into(),
            trade_id: String::new(),
        };
        let e = IncomeEntry::from_record(rec, "A");
        assert_eq!(e.amount, Decimal::ZERO);
    }

    #[test]
    fn profit_series_sorts_by_time() {
        let entries = vec![entry(2_000, "1"), entry(1_000, "2"), entry(3_000, "-0.5")];
        let series = profit_series(&entries, DayZone::Utc);
        let acc: Vec<String> = series.iter().map(|p| p.accumulated.to_string()).collect();
        assert_eq!(acc, vec!["2", "3", "2.5"]);
    }

    #[test]
    fn account_names_keep_input_order() {
        let accounts = vec![
            AccountIncome::from_records(account("Zeta"), vec![]),
            AccountIncome::from_records(account("Alpha"), vec![]),
            AccountIncome::from_records(account("Zeta"), vec![]),
        ];
        assert_eq!(account_names(&accounts), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn duplicate_names_share_one_line() {
        let day = 86_400_000;
        let a1 = AccountIncome {
            account: account("Main"),
            entries: vec![entry(0, "1")],
            error: None,
        };
        let a2 = AccountIncome {
            account: Account {
                id: "other".into(),
                ..account("Main")
            },
            entries: vec![entry(day, "2")],
            error: None,
        };
        let series = build_accumulated_series(&[a1, a2], DayZone::Utc);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].value_by_account["Main"], Decimal::new(3, 0));
        assert_eq!(series[1].total, Decimal::new(3, 0));
    }
}
