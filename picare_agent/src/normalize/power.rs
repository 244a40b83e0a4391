//! Power-cycle normalizer.
//!
//! Input is `<on-timestamp>|<comma-separated reboot history>`, most recent first.
//! `now` is passed in so the function stays pure; naive timestamps are read in its zone.

use crate::types::PowerRecord;
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};

const DATED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

// `last -x` style, no year: "Jan 5 10:00[:SS]" once the weekday is dropped
const YEARLESS_FORMATS: &[&str] = &["%Y %b %d %H:%M:%S", "%Y %b %d %H:%M"];

pub fn parse_power<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> PowerRecord {
    if !raw.contains('|') {
        return PowerRecord::default();
    }
    let mut parts = raw.split('|').map(str::trim);
    let on_str = parts.next().unwrap_or_default();
    let history = parts.next().unwrap_or_default();

    // a bad "on" time makes every derived duration meaningless
    let Some(on) = parse_timestamp(on_str, now) else {
        return PowerRecord::default();
    };

    let mut rec = PowerRecord {
        powered_on_at: Some(on),
        on_duration_secs: secs_between(on, now.with_timezone(&Utc)),
        ..PowerRecord::default()
    };

    // only the most recent entry counts; an unreadable one leaves the off fields unset
    let last_off = history.split(',').next().unwrap_or_default();
    if let Some(mut off) = parse_timestamp(last_off, now) {
        if off > on {
            off = minus_one_year(off);
        }
        rec.powered_off_at = Some(off);
        rec.off_duration_secs = secs_between(off, on);
    }
    rec
}

fn secs_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

fn minus_one_year(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_year(ts.year() - 1)
        .unwrap_or_else(|| ts - Duration::days(365))
}

/// Parses the timestamp shapes seen in uptime/last output.
pub(crate) fn parse_timestamp<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = DATED_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| parse_yearless(s, now.year()))?;

    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

fn parse_yearless(s: &str, year: i32) -> Option<NaiveDateTime> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    let is_word = |t: &str| t.chars().all(char::is_alphabetic);
    // weekday would have to agree with the injected year, so drop it
    if tokens.len() > 3 && is_word(tokens[0]) && is_word(tokens[1]) {
        tokens.remove(0);
    }
    let candidate = format!("{year} {}", tokens.join(" "));
    YEARLESS_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&candidate, f).ok())
}
