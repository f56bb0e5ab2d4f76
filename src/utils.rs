// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::pnl::YearMonth;
use anyhow::Result;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::time::Duration;

const UA: &str = concat!(
    "pnlclip/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/pnlclip)"
);

pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let c = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.parse::<YearMonth>()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Money cell for a breakdown column; a missing value renders as "-".
pub fn fmt_cell(d: Option<&Decimal>) -> String {
    match d {
        Some(v) if !v.is_zero() => fmt_money(v),
        _ => "-".to_string(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// 1-based page of `rows`. Out-of-range pages are empty.
pub fn paginate<T>(rows: &[T], page: usize, rows_per_page: usize) -> &[T] {
    if rows_per_page == 0 {
        return rows;
    }
    let start = page.saturating_sub(1).saturating_mul(rows_per_page);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + rows_per_page).min(rows.len());
    &rows[start..end]
}

pub fn total_pages(total_rows: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        1
    } else {
        total_rows.div_ceil(rows_per_page)
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_one_based() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&rows, 1, 10), &rows[0..10]);
        assert_eq!(paginate(&rows, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(paginate(&rows, 4, 10).is_empty());
        assert_eq!(paginate(&rows, 0, 10), &rows[0..10]);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn money_formatting_rounds_to_cents() {
        assert_eq!(fmt_money(&Decimal::new(-12346, 3)), "-12.35");
        assert_eq!(fmt_money(&Decimal::new(10, 0)), "10.00");
        assert_eq!(fmt_cell(None), "-");
        assert_eq!(fmt_cell(Some(&Decimal::ZERO)), "-");
    }
}
