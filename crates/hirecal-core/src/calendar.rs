use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Months are 0-indexed throughout the public API: 0 = January, 11 = December.
pub const MONTHS_PER_YEAR: u32 = 12;

/// A plain (year, month, day) triple with no time-of-day and no timezone.
/// Always valid per Gregorian rules; construct via `new` or `from_naive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> anyhow::Result<Self> {
        ensure_month(month)?;
        NaiveDate::from_ymd_opt(year, month + 1, day)
            .ok_or_else(|| anyhow!("invalid calendar day: {year:04}-{:02}-{day:02}", month + 1))?;
        Ok(Self { year, month, day })
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
        }
    }

    pub fn to_naive(self) -> anyhow::Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day)
            .ok_or_else(|| anyhow!("calendar date out of chrono range: {self}"))
    }

    /// Canonical `YYYY-MM-DD` form used as the bucket key in `EventsByDate`.
    pub fn date_key(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month + 1, self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date_key())
    }
}

impl FromStr for CalendarDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("expected YYYY-MM-DD, got: {s}"))?;
        Ok(Self::from_naive(parsed))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.date_key())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn ensure_month(month: u32) -> anyhow::Result<()> {
    if month >= MONTHS_PER_YEAR {
        bail!("month index out of range (expected 0..=11): {month}");
    }
    Ok(())
}

fn first_of_month(year: i32, month: u32) -> anyhow::Result<NaiveDate> {
    ensure_month(month)?;
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .ok_or_else(|| anyhow!("year out of supported range: {year}"))
}

/// Number of days in the given month, leap years included.
pub fn days_in_month(year: i32, month: u32) -> anyhow::Result<u32> {
    let first = first_of_month(year, month)?;
    let (next_year, next_month) = next_month(year, month)?;
    let next_first = first_of_month(next_year, next_month)?;
    Ok((next_first - first).num_days() as u32)
}

/// Weekday of the first day of the month, 0 = Sunday .. 6 = Saturday.
pub fn first_weekday_of_month(year: i32, month: u32) -> anyhow::Result<u32> {
    Ok(first_of_month(year, month)?.weekday().num_days_from_sunday())
}

pub fn previous_month(year: i32, month: u32) -> anyhow::Result<(i32, u32)> {
    ensure_month(month)?;
    if month == 0 {
        Ok((year - 1, MONTHS_PER_YEAR - 1))
    } else {
        Ok((year, month - 1))
    }
}

pub fn next_month(year: i32, month: u32) -> anyhow::Result<(i32, u32)> {
    ensure_month(month)?;
    if month == MONTHS_PER_YEAR - 1 {
        Ok((year + 1, 0))
    } else {
        Ok((year, month + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CalendarDate, days_in_month, first_weekday_of_month, next_month, previous_month,
    };

    #[test]
    fn february_days_follow_leap_rules() {
        assert_eq!(days_in_month(2024, 1).expect("leap year"), 29);
        assert_eq!(days_in_month(2023, 1).expect("common year"), 28);
        assert_eq!(days_in_month(2000, 1).expect("century leap"), 29);
        assert_eq!(days_in_month(1900, 1).expect("century common"), 28);
    }

    #[test]
    fn month_lengths_for_a_full_year() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (month, days) in expected.into_iter().enumerate() {
            assert_eq!(days_in_month(2025, month as u32).expect("valid month"), days);
        }
    }

    #[test]
    fn april_2025_starts_on_tuesday() {
        assert_eq!(first_weekday_of_month(2025, 3).expect("valid month"), 2);
    }

    #[test]
    fn rollover_at_year_boundaries() {
        assert_eq!(next_month(2025, 11).expect("december"), (2026, 0));
        assert_eq!(previous_month(2025, 0).expect("january"), (2024, 11));
        assert_eq!(next_month(2025, 4).expect("may"), (2025, 5));
        assert_eq!(previous_month(2025, 4).expect("may"), (2025, 3));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(days_in_month(2025, 12).is_err());
        assert!(first_weekday_of_month(2025, 13).is_err());
        assert!(CalendarDate::new(2025, 12, 1).is_err());
    }

    #[test]
    fn invalid_day_is_rejected() {
        assert!(CalendarDate::new(2023, 1, 29).is_err());
        assert!(CalendarDate::new(2024, 1, 29).is_ok());
        assert!(CalendarDate::new(2025, 3, 31).is_err());
    }

    #[test]
    fn date_key_is_one_indexed_iso() {
        let date = CalendarDate::new(2025, 3, 20).expect("valid date");
        assert_eq!(date.date_key(), "2025-04-20");
        assert_eq!("2025-04-20".parse::<CalendarDate>().expect("parse"), date);
    }

    #[test]
    fn ordering_follows_the_calendar() {
        let earlier = CalendarDate::new(2025, 3, 30).expect("valid date");
        let later = CalendarDate::new(2025, 4, 1).expect("valid date");
        assert!(earlier < later);
    }
}
