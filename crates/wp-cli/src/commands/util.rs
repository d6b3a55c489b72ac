//! Shared utilities for CLI commands.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use crate::Config;
use crate::cli::DataArgs;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as ISO 8601, a bare date, or relative time.
///
/// Supports:
/// - ISO 8601: "2021-03-01T10:30:00Z"
/// - Date: "2021-03-01" (midnight UTC)
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2021-03-01T10:30:00Z), a date (2021-03-01) or relative (e.g., '30 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Record paths from the command line, falling back to the config.
pub fn data_paths(args: &DataArgs, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let paths = if args.data.is_empty() {
        config.data_paths.clone()
    } else {
        args.data.clone()
    };
    if paths.is_empty() {
        anyhow::bail!("no activity records given; pass --data or set data_paths in the config");
    }
    Ok(paths)
}

/// Formats minutes as "Xh Ym" if >= 1 hour, "Xm" otherwise.
/// Fractions are floored; negative or NaN values are treated as 0m.
#[allow(clippy::cast_possible_truncation)]
pub fn format_minutes(minutes: f64) -> String {
    if minutes.is_nan() || minutes < 0.0 {
        return "0m".to_string();
    }
    let total_minutes = minutes.floor() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
