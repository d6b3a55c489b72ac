//! Overlap between work phases and arbitrary query windows.
//!
//! All functions here are pure over `(phases, interval)` and only read the
//! phase list, so any number of queries can run at once.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::phase::WorkPhase;
use crate::types::ValidationError;

/// A half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QueryInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl QueryInterval {
    /// Creates an interval, rejecting an end before the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// For bounds already known to be ordered.
    pub(crate) const fn from_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// An interval of `length` starting at `start`. Negative lengths collapse to empty.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start + length.max(Duration::zero()),
        }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The common part of two intervals, if they share any time.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }
}

/// Whether `phase` shares any time with `interval`.
///
/// A zero-length phase counts when its instant lies inside the interval.
pub fn overlaps(phase: &WorkPhase, interval: &QueryInterval) -> bool {
    if interval.is_empty() {
        return false;
    }
    if phase.start() == phase.end() {
        return interval.contains(phase.start());
    }
    phase.start() < interval.end() && phase.end() > interval.start()
}

/// Length of the intersection between `phase` and `interval`.
pub fn overlap_duration(phase: &WorkPhase, interval: &QueryInterval) -> Duration {
    let start = phase.start().max(interval.start());
    let end = phase.end().min(interval.end());
    (end - start).max(Duration::zero())
}

/// Total minutes of work inside `interval`, fractional and never negative.
#[allow(clippy::cast_precision_loss)]
pub fn work_minutes(phases: &[WorkPhase], interval: &QueryInterval) -> f64 {
    let total_ms: i64 = candidates(phases, interval)
        .map(|p| overlap_duration(p, interval).num_milliseconds())
        .sum();
    total_ms as f64 / 60_000.0
}

/// Whether any phase overlaps `interval`.
pub fn is_active(phases: &[WorkPhase], interval: &QueryInterval) -> bool {
    candidates(phases, interval).any(|p| overlaps(p, interval))
}

/// Phases that might touch `interval`.
///
/// Phases are sorted and disjoint, so their ends are sorted too: skip the ones
/// ending before the window and stop at the first one starting after it.
fn candidates<'a>(
    phases: &'a [WorkPhase],
    interval: &QueryInterval,
) -> impl Iterator<Item = &'a WorkPhase> + use<'a> {
    let window_start = interval.start();
    let window_end = interval.end();
    let first = phases.partition_point(|p| p.end() < window_start);
    phases[first..]
        .iter()
        .take_while(move |p| p.start() < window_end)
}
