use anyhow::{Context, anyhow};
use chrono::Duration;
use regex::Regex;

use crate::calendar::CalendarDate;

/// Parses a date argument relative to an explicitly supplied `today`.
/// Nothing here touches the system clock; the caller resolves "now" once
/// at the entry point and threads it through.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_arg(input: &str, today: CalendarDate) -> anyhow::Result<CalendarDate> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return shift_days(today, 1),
        "yesterday" => return shift_days(today, -1),
        _ => {}
    }

    let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)d$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;
    if let Some(caps) = rel_re.captures(token) {
        let num: i64 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative day count")?;
        let sign = caps
            .name("sign")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative sign"))?;
        let delta = if sign == "-" { -num } else { num };
        return shift_days(today, delta);
    }

    token
        .parse::<CalendarDate>()
        .with_context(|| format!("unrecognized date argument: {input}"))
        .context("supported forms: today/tomorrow/yesterday, +Nd/-Nd, YYYY-MM-DD")
}

/// Parses a month argument into a 0-indexed (year, month) pair.
/// Accepts `YYYY-MM`, a bare month name (resolved to its next occurrence
/// on or after `today`), or nothing meaningful, in which case the caller
/// should default to today's month.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_month_arg(input: &str, today: CalendarDate) -> anyhow::Result<(i32, u32)> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    if let Some(month) = parse_month_name(&lower) {
        let year = if month < today.month {
            today.year + 1
        } else {
            today.year
        };
        return Ok((year, month));
    }

    if let Some((year_text, month_text)) = token.split_once('-') {
        let year: i32 = year_text
            .parse()
            .with_context(|| format!("invalid year in month argument: {input}"))?;
        let month_one_indexed: u32 = month_text
            .parse()
            .with_context(|| format!("invalid month in month argument: {input}"))?;
        if !(1..=12).contains(&month_one_indexed) {
            return Err(anyhow!("month out of range in: {input}"));
        }
        return Ok((year, month_one_indexed - 1));
    }

    Err(anyhow!("unrecognized month argument: {input}"))
        .context("supported forms: YYYY-MM, month names (e.g. april)")
}

fn shift_days(date: CalendarDate, delta: i64) -> anyhow::Result<CalendarDate> {
    let shifted = date
        .to_naive()?
        .checked_add_signed(Duration::days(delta))
        .ok_or_else(|| anyhow!("date arithmetic overflow: {date} {delta:+}d"))?;
    Ok(CalendarDate::from_naive(shifted))
}

fn parse_month_name(token: &str) -> Option<u32> {
    match token.trim() {
        "january" | "jan" => Some(0),
        "february" | "feb" => Some(1),
        "march" | "mar" => Some(2),
        "april" | "apr" => Some(3),
        "may" => Some(4),
        "june" | "jun" => Some(5),
        "july" | "jul" => Some(6),
        "august" | "aug" => Some(7),
        "september" | "sep" | "sept" => Some(8),
        "october" | "oct" => Some(9),
        "november" | "nov" => Some(10),
        "december" | "dec" => Some(11),
        _ => None,
    }
}
