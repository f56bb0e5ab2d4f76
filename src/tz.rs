// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time zone used to turn epoch milliseconds into calendar days.
///
/// `Local` follows whatever zone the host is configured with, so two
/// machines can bucket the same record into different days. `Utc` and
/// `Fixed` give reproducible results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayZone {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl DayZone {
    /// Calendar day containing `millis`, or `None` when the timestamp is out
    /// of chrono's range.
    pub fn date_of(&self, millis: i64) -> Option<NaiveDate> {
        let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
        Some(match self {
            DayZone::Local => utc.with_timezone(&Local).date_naive(),
            DayZone::Utc => utc.date_naive(),
            DayZone::Fixed(off) => utc.with_timezone(off).date_naive(),
        })
    }

    /// First millisecond of `date` in this zone.
    pub fn start_of_day_millis(&self, date: NaiveDate) -> Result<i64> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .with_context(|| format!("Invalid date {}", date))?;
        let ms = match self {
            DayZone::Local => first_instant(&Local, midnight),
            DayZone::Utc => first_instant(&Utc, midnight),
            DayZone::Fixed(off) => first_instant(off, midnight),
        };
        ms.with_context(|| format!("No local midnight on {} in zone {}", date, self))
    }

    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self {
            DayZone::Local => now.with_timezone(&Local).date_naive(),
            DayZone::Utc => now.date_naive(),
            DayZone::Fixed(off) => now.with_timezone(off).date_naive(),
        }
    }

    pub fn format_millis(&self, millis: i64, fmt: &str) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis(millis) else {
            return millis.to_string();
        };
        match self {
            DayZone::Local => utc.with_timezone(&Local).format(fmt).to_string(),
            DayZone::Utc => utc.format(fmt).to_string(),
            DayZone::Fixed(off) => utc.with_timezone(off).format(fmt).to_string(),
        }
    }
}

// Midnight can fall inside a DST gap; the day then starts an hour later.
fn first_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
}

impl FromStr for DayZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "local" => return Ok(DayZone::Local),
            "utc" | "z" => return Ok(DayZone::Utc),
            _ => {}
        }
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(anyhow!("Invalid timezone '{}', expected local|utc|+HH:MM", s)),
        };
        let (h, m) = rest
            .split_once(':')
            .with_context(|| format!("Invalid timezone '{}', expected local|utc|+HH:MM", s))?;
        let h = two_digits(h).with_context(|| format!("Invalid hour in '{}'", s))?;
        let m = two_digits(m)
            .filter(|m| *m < 60)
            .with_context(|| format!("Invalid minute in '{}'", s))?;
        FixedOffset::east_opt(sign * (h * 3600 + m * 60))
            .map(DayZone::Fixed)
            .with_context(|| format!("Offset '{}' out of range", s))
    }
}

// One or two ASCII digits; signs are not allowed past the leading one.
fn two_digits(part: &str) -> Option<i32> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl TryFrom<String> for DayZone {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DayZone> for String {
    fn from(z: DayZone) -> Self {
        z.to_string()
    }
}

impl fmt::Display for DayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayZone::Local => f.write_str("local"),
            DayZone::Utc => f.write_str("utc"),
            DayZone::Fixed(off) => write!(f, "{}", off),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zone_names_and_offsets() {
        assert_eq!("local".parse::<DayZone>().unwrap(), DayZone::Local);
        assert_eq!("UTC".parse::<DayZone>().unwrap(), DayZone::Utc);
        let z: DayZone = "+08:00".parse().unwrap();
        assert_eq!(z, DayZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap()));
        assert_eq!(z.to_string(), "+08:00");
        let z: DayZone = "-05:30".parse().unwrap();
        assert_eq!(z, DayZone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap()));
        assert!("moon".parse::<DayZone>().is_err());
        assert!("+08:75".parse::<DayZone>().is_err());
    }

    #[test]
    fn rejects_doubled_signs() {
        assert!("+-05:00".parse::<DayZone>().is_err());
        assert!("++05:00".parse::<DayZone>().is_err());
        assert!("-05:-30".parse::<DayZone>().is_err());
        assert!("+5:00".parse::<DayZone>().is_ok());
    }

    #[test]
    fn day_boundary_depends_on_zone() {
        // 2025-03-01 23:30:00 UTC
        let ms = 1_740_871_800_000;
        assert_eq!(
            DayZone::Utc.date_of(ms),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        let tokyo: DayZone = "+09:00".parse().unwrap();
        assert_eq!(tokyo.date_of(ms), NaiveDate::from_ymd_opt(2025, 3, 2));
    }

    #[test]
    fn start_of_day_in_fixed_offset() {
        let z: DayZone = "+02:00".parse().unwrap();
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        // 2024-12-31 22:00:00 UTC
        assert_eq!(z.start_of_day_millis(d).unwrap(), 1_735_682_400_000);
    }
}
