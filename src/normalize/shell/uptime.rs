use chrono::{Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::string_lines;

/// Duration segment of an `uptime` line: optional day count, then either
/// `H:MM` or a bare count qualified by `min`/`hour(s)`. A bare minute
/// count zeroes the hours and a bare hour count zeroes the minutes.
static UPTIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"up\s+(?:(?P<days>\d+)\s+days?,\s+)?(?:(?P<hours>\d+):(?P<mins>\d+)|(?P<count>\d+)\s*(?P<unit>min|hours?))",
    )
    .unwrap()
});

/// Rewinds the collection moment by the reported uptime, yielding the
/// last reboot as `YYYY-MM-DD HH:MM`. The wall clock at the start of the
/// line anchors the time of day; the snapshot timestamp anchors the date.
pub(super) fn last_reboot(value: &Value, timestamp: Option<i64>) -> Option<Value> {
    let lines = string_lines(value)?;
    let line = lines.first()?;
    let timestamp = timestamp?;

    let clock = line.split(" up ").next()?.trim();
    let clock_parts: Vec<&str> = clock.split(':').collect();
    if clock_parts.len() != 3 {
        return None;
    }
    let hour: u32 = clock_parts[0].trim().parse().ok()?;
    let minute: u32 = clock_parts[1].trim().parse().ok()?;
    let second: u32 = clock_parts[2].trim().parse().ok()?;

    let collected = Utc
        .timestamp_opt(timestamp, 0)
        .single()?
        .date_naive()
        .and_hms_opt(hour, minute, second)?;

    let caps = UPTIME_RE.captures(line)?;
    let days = named_count(&caps, "days")?;
    let (hours, minutes) = if let Some(count) = caps.name("count") {
        let count: i64 = count.as_str().parse().ok()?;
        match caps.name("unit").map(|u| u.as_str()) {
            Some("min") => (0, count),
            _ => (count, 0),
        }
    } else {
        (named_count(&caps, "hours")?, named_count(&caps, "mins")?)
    };

    // Counts far beyond any real uptime overflow the duration or the
    // calendar; such captures drop like any other malformed line.
    let booted = collected
        .checked_sub_signed(Duration::try_days(days)?)?
        .checked_sub_signed(Duration::try_hours(hours)?)?
        .checked_sub_signed(Duration::try_minutes(minutes)?)?;
    Some(Value::from(booted.format("%Y-%m-%d %H:%M").to_string()))
}

/// An absent optional group counts zero; a captured count that does not
/// fit `i64` fails the parse.
fn named_count(caps: &regex::Captures, group: &str) -> Option<i64> {
    match caps.name(group) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
    }
}
