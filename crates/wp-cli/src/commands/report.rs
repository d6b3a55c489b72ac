//! Report command for half-hour activity grids.
//!
//! This module implements `wp report`: one row per day with a 48-cell grid of
//! half-hour intensities, then per-month and whole-range work totals, either
//! human-readable or as JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use wp_core::report::CELLS_PER_DAY;
use wp_core::{AnalysisRange, PhaseConfig, RangeReport, Timeline, build_report, segment};

use super::load::load_timeline;
use super::util::{data_paths, format_minutes, parse_datetime};
use crate::Config;
use crate::cli::ReportArgs;

// ========== Range Resolution ==========

/// Work out the analysis range from the flags and the timeline.
///
/// Missing bounds default to midnight of the first event's day and midnight
/// after the last event's day. Returns `None` when a bound is missing and
/// there are no events to derive it from.
pub fn resolve_range(
    timeline: &Timeline,
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<AnalysisRange>> {
    let start = match start {
        Some(s) => Some(parse_datetime(s, now).context("invalid --start")?),
        None => timeline
            .first_at()
            .map(|t| t.date_naive().and_time(NaiveTime::MIN).and_utc()),
    };
    let end = match end {
        Some(s) => Some(parse_datetime(s, now).context("invalid --end")?),
        None => timeline
            .last_at()
            .map(|t| t.date_naive().and_time(NaiveTime::MIN).and_utc() + Duration::days(1)),
    };

    let (Some(start), Some(end)) = (start, end) else {
        return Ok(None);
    };
    let range = AnalysisRange::new(start, end).context("--end must be after --start")?;
    Ok(Some(range))
}

// ========== Text Output ==========

const DAY_LABEL_WIDTH: usize = 16;

fn hour_axis() -> String {
    let mut axis = String::new();
    for hour in (0..24).step_by(3) {
        write!(axis, "{hour:02}    ").unwrap();
    }
    axis.trim_end().to_string()
}

/// Formats the human-readable report output.
#[allow(clippy::cast_precision_loss)]
pub fn format_report(report: &RangeReport, phase_config: &PhaseConfig) -> String {
    let mut output = String::new();

    let first_day = report.range.start().date_naive();
    let last_day = (report.range.end() - Duration::seconds(1)).date_naive();
    writeln!(output, "WORK REPORT: {first_day} to {last_day} (UTC)").unwrap();
    writeln!(
        output,
        "Gap threshold: {}",
        format_minutes(phase_config.gap_threshold_minutes as f64)
    )
    .unwrap();

    // Day grid
    writeln!(output).unwrap();
    writeln!(output, "{:<DAY_LABEL_WIDTH$}{}", "DAY", hour_axis()).unwrap();
    for day in &report.days {
        let cells: String = day.cells.iter().map(|c| c.intensity.symbol()).collect();
        debug_assert_eq!(cells.len(), CELLS_PER_DAY);
        let label = format!("{} {}", day.date, day.date.format("%a"));
        writeln!(
            output,
            "{label:<DAY_LABEL_WIDTH$}{cells}  {:>7}",
            format_minutes(day.work_minutes)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(
        output,
        "Legend: . idle  - working  + 1 event  * 2-3 events  # 4+ events"
    )
    .unwrap();

    // MONTHS section
    writeln!(output).unwrap();
    writeln!(output, "MONTHS").unwrap();
    writeln!(output, "──────").unwrap();
    for month in &report.months {
        let plural = if month.active_days == 1 { "" } else { "s" };
        writeln!(
            output,
            "{:04}-{:02}  {:>9}  ({} active day{plural})",
            month.year,
            month.month,
            format_minutes(month.work_minutes),
            month.active_days
        )
        .unwrap();
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Total worked:  {}", format_minutes(report.total_minutes)).unwrap();
    writeln!(output, "Work phases:   {}", report.phase_count).unwrap();
    writeln!(output, "Events:        {}", report.event_count).unwrap();

    output
}

fn format_empty() -> String {
    let mut output = String::new();
    writeln!(output, "No events recorded.").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Hint: pass --data, or --start and --end to report an empty range."
    )
    .unwrap();
    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub start: Option<String>,
    pub end: Option<String>,
    pub gap_threshold_minutes: i64,
    pub totals: JsonTotals,
    pub months: Vec<JsonMonth>,
    pub days: Vec<JsonDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub work_minutes: f64,
    pub phase_count: usize,
    pub event_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonMonth {
    pub month: String,
    pub work_minutes: f64,
    pub active_days: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub work_minutes: f64,
    pub event_count: usize,
    /// One intensity symbol per half-hour cell.
    pub cells: String,
}

impl JsonReport {
    fn from_report(report: &RangeReport, phase_config: &PhaseConfig) -> Self {
        Self {
            start: Some(report.range.start().to_rfc3339()),
            end: Some(report.range.end().to_rfc3339()),
            gap_threshold_minutes: phase_config.gap_threshold_minutes,
            totals: JsonTotals {
                work_minutes: report.total_minutes,
                phase_count: report.phase_count,
                event_count: report.event_count,
            },
            months: report
                .months
                .iter()
                .map(|m| JsonMonth {
                    month: format!("{:04}-{:02}", m.year, m.month),
                    work_minutes: m.work_minutes,
                    active_days: m.active_days,
                })
                .collect(),
            days: report
                .days
                .iter()
                .map(|d| JsonDay {
                    date: d.date.format("%Y-%m-%d").to_string(),
                    work_minutes: d.work_minutes,
                    event_count: d.event_count,
                    cells: d.cells.iter().map(|c| c.intensity.symbol()).collect(),
                })
                .collect(),
        }
    }

    const fn empty(phase_config: &PhaseConfig) -> Self {
        Self {
            start: None,
            end: None,
            gap_threshold_minutes: phase_config.gap_threshold_minutes,
            totals: JsonTotals {
                work_minutes: 0.0,
                phase_count: 0,
                event_count: 0,
            },
            months: Vec::new(),
            days: Vec::new(),
        }
    }
}

/// Formats report data as JSON.
pub fn format_report_json(report: &RangeReport, phase_config: &PhaseConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::from_report(
        report,
        phase_config,
    ))?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let paths = data_paths(&args.data, config)?;
    let timeline = load_timeline(&paths)?;
    let phase_config = config.phase_config(args.threshold.threshold);

    let range = resolve_range(
        &timeline,
        args.start.as_deref(),
        args.end.as_deref(),
        Utc::now(),
    )?;
    let Some(range) = range else {
        if args.json {
            let output = serde_json::to_string_pretty(&JsonReport::empty(&phase_config))?;
            writeln!(writer, "{output}")?;
        } else {
            write!(writer, "{}", format_empty())?;
        }
        return Ok(());
    };

    let phases = segment(&timeline, &phase_config);
    let report = build_report(&timeline, &phases, &range);

    if args.json {
        writeln!(writer, "{}", format_report_json(&report, &phase_config)?)?;
    } else {
        write!(writer, "{}", format_report(&report, &phase_config))?;
    }

    Ok(())
}
