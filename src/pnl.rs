// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{AccountIncome, DailyAggregate, IncomeEntry, checked_add};
use crate::tz::DayZone;
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| YearMonth { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current(zone: DayZone) -> Self {
        Self::containing(zone.today())
    }

    pub fn first_day(&self) -> NaiveDate {
        // `new` and `containing` only build valid months.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            YearMonth {
                year: self.year - 1,
                month: 12,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    /// "March 2025"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(Self::containing(d))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive millisecond bounds of a month: first day 00:00:00.000 through
/// last day 23:59:59.999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl MonthRange {
    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_millis && millis <= self.end_millis
    }
}

pub fn month_range(month: YearMonth, zone: DayZone) -> Result<MonthRange> {
    let start_millis = zone.start_of_day_millis(month.first_day())?;
    let next_start = zone.start_of_day_millis(month.next().first_day())?;
    if next_start <= start_millis {
        return Err(anyhow!("Empty month range for {}", month));
    }
    Ok(MonthRange {
        start_millis,
        end_millis: next_start - 1,
    })
}

/// Sum of PnL-type income inside the range.
pub fn monthly_pnl(entries: &[IncomeEntry], range: &MonthRange) -> Decimal {
    entries
        .iter()
        .filter(|e| range.contains(e.time))
        .filter(|e| e.income_type.is_pnl())
        .fold(Decimal::ZERO, |acc, e| {
            checked_add(acc, e.amount, &e.tran_id).unwrap_or(acc)
        })
}

pub fn monthly_pnl_for(entries: &[IncomeEntry], month: YearMonth, zone: DayZone) -> Result<Decimal> {
    let range = month_range(month, zone)?;
    Ok(monthly_pnl(entries, &range))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountMonthlyPnl {
    pub account_id: String,
    pub account_name: String,
    pub monthly_pnl: Decimal,
    pub error: Option<String>,
}

pub fn account_monthly_pnl(accounts: &[AccountIncome], range: &MonthRange) -> Vec<AccountMonthlyPnl> {
    accounts
        .iter()
        .map(|a| AccountMonthlyPnl {
            account_id: a.account.id.clone(),
            account_name: a.account.name.clone(),
            monthly_pnl: monthly_pnl(&a.entries, range),
            error: a.error.clone(),
        })
        .collect()
}

/// Accounts that failed to load are left out of the total.
pub fn total_monthly_pnl(cards: &[AccountMonthlyPnl]) -> Decimal {
    cards
        .iter()
        .filter(|c| c.error.is_none())
        .fold(Decimal::ZERO, |acc, c| {
            checked_add(acc, c.monthly_pnl, &c.account_name).unwrap_or(acc)
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub total_income: Decimal,
    pub income_by_account: BTreeMap<String, Decimal>,
    pub has_income: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub month: YearMonth,
    /// Empty cells before day 1 in a Sunday-first week grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

pub fn calendar_month(daily: &[DailyAggregate], month: YearMonth) -> CalendarMonth {
    let by_date: BTreeMap<NaiveDate, &DailyAggregate> =
        daily.iter().map(|row| (row.date, row)).collect();
    let days = month
        .days()
        .map(|date| match by_date.get(&date) {
            Some(row) => CalendarDay {
                date,
                total_income: row.total_income,
                income_by_account: row.income_by_account.clone(),
                has_income: true,
            },
            None => CalendarDay {
                date,
                total_income: Decimal::ZERO,
                income_by_account: BTreeMap::new(),
                has_income: false,
            },
        })
        .collect();
    CalendarMonth {
        month,
        leading_blanks: month.first_day().weekday().num_days_from_sunday(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_navigation_wraps_years() {
        let m: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(m.next().to_string(), "2025-01");
        assert_eq!(m.next().prev(), m);
        assert_eq!(m.label(), "December 2024");
    }

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days().count(), 29);
        assert_eq!(YearMonth::new(2025, 2).unwrap().days().count(), 28);
        assert!(YearMonth::new(2025, 13).is_none());
    }

    #[test]
    fn utc_range_ends_on_last_millisecond() {
        let r = month_range(YearMonth::new(2025, 1).unwrap(), DayZone::Utc).unwrap();
        assert_eq!(r.start_millis, 1_735_689_600_000);
        assert_eq!(r.end_millis, 1_738_367_999_999);
        assert!(r.contains(r.end_millis));
        assert!(!r.contains(r.end_millis + 1));
    }

    #[test]
    fn rejects_bad_month_strings() {
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }
}
