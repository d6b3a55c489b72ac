//! Calendar statistics over a date range.
//!
//! Buckets every UTC day of the range into half-hour cells and asks the
//! aggregator how much work falls into each cell, day, month and the whole
//! range. Days are independent queries against the read-only phase list, so
//! they are computed in parallel.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::aggregate::{self, QueryInterval};
use crate::phase::WorkPhases;
use crate::timeline::Timeline;
use crate::types::ValidationError;

/// Width of one calendar cell in minutes.
pub const CELL_MINUTES: i64 = 30;

/// Number of cells in one day.
pub const CELLS_PER_DAY: usize = 48;

/// The half-open `[start, end)` span a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl AnalysisRange {
    /// Creates a range; it must cover at least one instant.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whole UTC days from `first` through `last`, inclusive.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Result<Self, ValidationError> {
        Self::new(midnight(first), midnight(last) + Duration::days(1))
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The whole range as a query window.
    pub const fn interval(&self) -> QueryInterval {
        QueryInterval::from_ordered(self.start, self.end)
    }

    /// Every calendar date touched by the range.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let last = (self.end - Duration::seconds(1)).date_naive();
        first.iter_days().take_while(|d| *d <= last).collect()
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Display intensity of a cell, from its phase membership and event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// No phase and no events.
    Idle,
    /// Inside a phase but no events recorded.
    Working,
    /// One event.
    Light,
    /// Two or three events.
    Medium,
    /// Four or more events.
    Heavy,
}

impl Intensity {
    pub const fn from_cell(active: bool, event_count: usize) -> Self {
        match event_count {
            0 if active => Self::Working,
            0 => Self::Idle,
            1 => Self::Light,
            2 | 3 => Self::Medium,
            _ => Self::Heavy,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Idle => '.',
            Self::Working => '-',
            Self::Light => '+',
            Self::Medium => '*',
            Self::Heavy => '#',
        }
    }
}

/// One half-hour cell of a day.
#[derive(Debug, Clone, Serialize)]
pub struct CellStats {
    pub start: DateTime<Utc>,
    /// Whether any work phase overlaps the cell.
    pub active: bool,
    /// Events recorded inside the cell.
    pub event_count: usize,
    pub intensity: Intensity,
}

/// Statistics for one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub cells: Vec<CellStats>,
    /// Work minutes within the part of the day inside the range.
    pub work_minutes: f64,
    pub event_count: usize,
}

/// Statistics for one calendar month, clipped to the range.
#[derive(Debug, Clone, Serialize)]
pub struct MonthStats {
    pub year: i32,
    pub month: u32,
    pub work_minutes: f64,
    /// Days in the month with any work.
    pub active_days: usize,
}

/// Full report for an analysis range.
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub range: AnalysisRange,
    pub days: Vec<DayStats>,
    pub months: Vec<MonthStats>,
    pub total_minutes: f64,
    /// Phases overlapping the range.
    pub phase_count: usize,
    /// Events inside the range.
    pub event_count: usize,
}

/// Compute per-cell, per-day, per-month and total statistics for `range`.
pub fn build_report(timeline: &Timeline, phases: &WorkPhases, range: &AnalysisRange) -> RangeReport {
    let whole = range.interval();

    let days: Vec<DayStats> = range
        .dates()
        .into_par_iter()
        .map(|date| day_stats(timeline, phases, range, date))
        .collect();

    let months = month_stats(phases, range, &days);

    let phase_count = phases
        .iter()
        .filter(|p| aggregate::overlaps(p, &whole))
        .count();

    let report = RangeReport {
        range: *range,
        total_minutes: phases.work_minutes(&whole),
        phase_count,
        event_count: timeline.count_within(&whole),
        days,
        months,
    };

    tracing::debug!(
        days = report.days.len(),
        months = report.months.len(),
        total_minutes = report.total_minutes,
        "built range report"
    );
    report
}

fn day_stats(
    timeline: &Timeline,
    phases: &WorkPhases,
    range: &AnalysisRange,
    date: NaiveDate,
) -> DayStats {
    let day_start = midnight(date);
    let cell_length = Duration::minutes(CELL_MINUTES);
    let bounds = range.interval();

    let cells = (0..CELLS_PER_DAY)
        .scan(day_start, |cell_start, _| {
            let cell = QueryInterval::starting_at(*cell_start, cell_length);
            *cell_start = cell.end();
            Some(cell)
        })
        .map(|cell| {
            // Cells outside the range stay idle
            let clipped = cell.intersect(&bounds);
            let active = clipped.is_some_and(|q| phases.is_active(&q));
            let event_count = clipped.map_or(0, |q| timeline.count_within(&q));
            CellStats {
                start: cell.start(),
                active,
                event_count,
                intensity: Intensity::from_cell(active, event_count),
            }
        })
        .collect();

    let day = QueryInterval::starting_at(day_start, Duration::days(1));
    let clipped = day.intersect(&bounds);

    DayStats {
        date,
        cells,
        work_minutes: clipped.map_or(0.0, |q| phases.work_minutes(&q)),
        event_count: clipped.map_or(0, |q| timeline.count_within(&q)),
    }
}

/// Group consecutive days by month and query each month's span once.
fn month_stats(phases: &WorkPhases, range: &AnalysisRange, days: &[DayStats]) -> Vec<MonthStats> {
    days.chunk_by(|a, b| a.date.year() == b.date.year() && a.date.month() == b.date.month())
        .filter_map(|group| {
            let (first, last) = (group.first()?, group.last()?);
            let span = QueryInterval::new(
                midnight(first.date),
                midnight(last.date) + Duration::days(1),
            )
            .ok()?
            .intersect(&range.interval())?;

            Some(MonthStats {
                year: first.date.year(),
                month: first.date.month(),
                work_minutes: phases.work_minutes(&span),
                active_days: group.iter().filter(|d| d.work_minutes > 0.0).count(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventProvenance};
    use crate::event_kind::EventKind;
    use crate::phase::{PhaseConfig, segment};
    use crate::types::{EventId, SourceId};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, day, hour, minute, 0).unwrap()
    }

    fn timeline_at(instants: &[DateTime<Utc>]) -> Timeline {
        let events = instants
            .iter()
            .enumerate()
            .map(|(i, t)| Event {
                id: EventId::new(format!("c{i}")).unwrap(),
                kind: EventKind::Commit,
                timestamp: *t,
                provenance: EventProvenance::PlainCommit,
                source: SourceId::new("repo").unwrap(),
                payload: serde_json::Value::Null,
            })
            .collect();
        Timeline::build([events])
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_range_rejects_empty() {
        assert!(AnalysisRange::new(at(1, 0, 0), at(1, 0, 0)).is_err());
        assert!(AnalysisRange::new(at(2, 0, 0), at(1, 0, 0)).is_err());
    }

    #[test]
    fn test_range_dates_exclude_end_midnight() {
        let range = AnalysisRange::days(date(2021, 3, 1), date(2021, 3, 3)).unwrap();
        assert_eq!(
            range.dates(),
            [date(2021, 3, 1), date(2021, 3, 2), date(2021, 3, 3)]
        );

        let partial = AnalysisRange::new(at(1, 12, 0), at(2, 0, 30)).unwrap();
        assert_eq!(partial.dates(), [date(2021, 3, 1), date(2021, 3, 2)]);
    }

    #[test]
    fn test_intensity_symbols() {
        assert_eq!(Intensity::from_cell(false, 0).symbol(), '.');
        assert_eq!(Intensity::from_cell(true, 0).symbol(), '-');
        assert_eq!(Intensity::from_cell(true, 1).symbol(), '+');
        assert_eq!(Intensity::from_cell(true, 3).symbol(), '*');
        assert_eq!(Intensity::from_cell(true, 9).symbol(), '#');
    }

    #[test]
    fn test_cells_mark_phase_and_events() {
        let timeline = timeline_at(&[at(1, 9, 0), at(1, 9, 30), at(1, 13, 0)]);
        let phases = segment(&timeline, &PhaseConfig::new(120));
        let range = AnalysisRange::days(date(2021, 3, 1), date(2021, 3, 1)).unwrap();

        let report = build_report(&timeline, &phases, &range);
        let day = &report.days[0];
        assert_eq!(day.cells.len(), CELLS_PER_DAY);

        let symbols: String = day.cells.iter().map(|c| c.intensity.symbol()).collect();
        // 09:00 cell has one event, 09:30 one event (phase ends 09:35), 13:00 one event
        assert_eq!(&symbols[16..30], "..++......+...");
        assert!(day.cells[19].active);
        assert!(!day.cells[20].active);
        assert!(approx(day.work_minutes, 40.0));
        assert_eq!(day.event_count, 3);
    }

    #[test]
    fn test_days_sum_to_total() {
        let timeline = timeline_at(&[
            at(1, 22, 0),
            at(1, 23, 50),
            at(2, 1, 0),
            at(3, 10, 0),
            at(3, 10, 40),
        ]);
        let phases = segment(&timeline, &PhaseConfig::default());
        let range = AnalysisRange::days(date(2021, 3, 1), date(2021, 3, 4)).unwrap();

        let report = build_report(&timeline, &phases, &range);
        let day_sum: f64 = report.days.iter().map(|d| d.work_minutes).sum();

        assert!(approx(day_sum, report.total_minutes));
        assert!(approx(report.total_minutes, phases.total_minutes()));
        assert!(approx(report.days[0].work_minutes, 120.0));
        assert!(approx(report.days[1].work_minutes, 65.0));
        assert!(approx(report.days[3].work_minutes, 0.0));
        assert_eq!(report.phase_count, 2);
        assert_eq!(report.event_count, 5);
    }

    #[test]
    fn test_range_clips_phases() {
        let timeline = timeline_at(&[at(1, 9, 0), at(1, 11, 0)]);
        let phases = segment(&timeline, &PhaseConfig::default());
        let range = AnalysisRange::new(at(1, 10, 0), at(2, 0, 0)).unwrap();

        let report = build_report(&timeline, &phases, &range);
        assert!(approx(report.total_minutes, 65.0));
        assert!(approx(report.days[0].work_minutes, 65.0));
        assert_eq!(report.event_count, 1);
    }

    #[test]
    fn test_cells_before_range_start_are_idle() {
        let timeline = timeline_at(&[at(1, 9, 0), at(1, 11, 0)]);
        let phases = segment(&timeline, &PhaseConfig::default());
        let range = AnalysisRange::new(at(1, 10, 0), at(1, 23, 0)).unwrap();

        let report = build_report(&timeline, &phases, &range);
        let day = &report.days[0];

        // 09:00 and 09:30 lie before the range even though the phase covers them
        assert_eq!(day.cells[18].intensity, Intensity::Idle);
        assert_eq!(day.cells[19].intensity, Intensity::Idle);
        assert_eq!(day.cells[20].intensity, Intensity::Working);
        assert_eq!(day.cells[22].intensity, Intensity::Light);
        assert_eq!(day.cells[46].intensity, Intensity::Idle);

        let cell_events: usize = day.cells.iter().map(|c| c.event_count).sum();
        assert_eq!(cell_events, day.event_count);
        assert_eq!(day.event_count, 1);
    }

    #[test]
    fn test_months_split_across_boundary() {
        let timeline = timeline_at(&[
            Utc.with_ymd_and_hms(2021, 2, 27, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 2, 28, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 3, 1, 0, 30, 0).unwrap(),
        ]);
        let phases = segment(&timeline, &PhaseConfig::default());
        let range = AnalysisRange::days(date(2021, 2, 27), date(2021, 3, 2)).unwrap();

        let report = build_report(&timeline, &phases, &range);

        assert_eq!(report.months.len(), 2);
        assert_eq!((report.months[0].year, report.months[0].month), (2021, 2));
        assert_eq!((report.months[1].year, report.months[1].month), (2021, 3));
        assert!(approx(report.months[0].work_minutes, 5.0 + 60.0));
        assert!(approx(report.months[1].work_minutes, 35.0));
        assert_eq!(report.months[0].active_days, 2);
        assert_eq!(report.months[1].active_days, 1);
    }

    #[test]
    fn test_empty_timeline_reports_zero() {
        let timeline = Timeline::default();
        let phases = segment(&timeline, &PhaseConfig::default());
        let range = AnalysisRange::days(date(2021, 1, 1), date(2021, 1, 1)).unwrap();

        let report = build_report(&timeline, &phases, &range);
        assert!(approx(report.total_minutes, 0.0));
        assert_eq!(report.phase_count, 0);
        assert!(report.days[0].cells.iter().all(|c| c.intensity == Intensity::Idle));
    }
}
