//! Work phase segmentation.
//!
//! Splits the timeline into continuous working sessions. Events are treated as
//! samples of otherwise unobserved work: a silence longer than the gap
//! threshold means work stopped, anything shorter belongs to the same phase.
//!
//! # Algorithm Summary
//!
//! 1. Empty timeline: no phases
//! 2. Open a phase at the first event
//! 3. For each consecutive pair, if the gap exceeds the threshold, close the
//!    open phase at `last + PHASE_PADDING` (never past the next event) and open
//!    a new one at the next event
//! 4. Close the final phase at `last + PHASE_PADDING`
//!
//! Every phase therefore ends `PHASE_PADDING` after its last event, including
//! a phase holding a single trailing event.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, QueryInterval};
use crate::timeline::Timeline;
use crate::types::ValidationError;

/// Residual work assumed after the last event of a phase, in minutes.
pub const PHASE_PADDING_MINUTES: i64 = 5;

/// Default gap threshold in minutes.
pub const DEFAULT_GAP_THRESHOLD_MINUTES: i64 = 240;

/// Configuration for phase segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Longest silence, in minutes, that still counts as the same phase.
    /// Zero splits on every distinct timestamp; negative values split
    /// between every pair of events, even simultaneous ones.
    /// Default: 240 (4 hours).
    pub gap_threshold_minutes: i64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            gap_threshold_minutes: DEFAULT_GAP_THRESHOLD_MINUTES,
        }
    }
}

impl PhaseConfig {
    pub const fn new(gap_threshold_minutes: i64) -> Self {
        Self {
            gap_threshold_minutes,
        }
    }

    fn gap_threshold(&self) -> Duration {
        Duration::minutes(self.gap_threshold_minutes)
    }
}

fn phase_padding() -> Duration {
    Duration::minutes(PHASE_PADDING_MINUTES)
}

/// An inferred continuous working session `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorkPhase {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl WorkPhase {
    /// Creates a phase, rejecting an end before the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the phase in fractional minutes.
    #[allow(clippy::cast_precision_loss)]
    pub fn minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }
}

/// The phase list for one analysis run.
///
/// Sorted by start, pairwise non-overlapping, and never mutated after
/// segmentation. Shareable across threads for read-only queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkPhases(Vec<WorkPhase>);

impl WorkPhases {
    pub fn as_slice(&self) -> &[WorkPhase] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkPhase> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all phase durations in minutes.
    pub fn total_minutes(&self) -> f64 {
        self.0.iter().map(WorkPhase::minutes).sum()
    }

    /// Minutes of work overlapping `interval`.
    pub fn work_minutes(&self, interval: &QueryInterval) -> f64 {
        aggregate::work_minutes(&self.0, interval)
    }

    /// Whether any phase overlaps `interval`.
    pub fn is_active(&self, interval: &QueryInterval) -> bool {
        aggregate::is_active(&self.0, interval)
    }
}

impl<'a> IntoIterator for &'a WorkPhases {
    type Item = &'a WorkPhase;
    type IntoIter = std::slice::Iter<'a, WorkPhase>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Segment a timeline into work phases.
pub fn segment(timeline: &Timeline, config: &PhaseConfig) -> WorkPhases {
    let phases = segment_instants(timeline.events().iter().map(|e| e.timestamp), config);
    tracing::debug!(
        events = timeline.len(),
        phases = phases.len(),
        gap_threshold_minutes = config.gap_threshold_minutes,
        "segmented timeline into work phases"
    );
    phases
}

/// Segment ascending instants into phases.
fn segment_instants<I>(instants: I, config: &PhaseConfig) -> WorkPhases
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let threshold = config.gap_threshold();
    let padding = phase_padding();

    let mut instants = instants.into_iter();
    let Some(first) = instants.next() else {
        return WorkPhases::default();
    };

    let mut phases = Vec::new();
    let mut start = first;
    let mut last = first;

    for next in instants {
        if next - last > threshold {
            // Clamped so a short threshold can't make the padding run into the next phase
            let end = (last + padding).min(next);
            phases.push(WorkPhase { start, end });
            start = next;
        }
        last = next;
    }

    phases.push(WorkPhase {
        start,
        end: last + padding,
    });

    WorkPhases(phases)
}
