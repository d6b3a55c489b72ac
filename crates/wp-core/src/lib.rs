//! Core domain logic for work phase inference.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: reading commit and issue-event records into events
//! - Timeline: merging and deduplicating events across sources
//! - Phases: segmenting the timeline into continuous working sessions
//! - Aggregation: minutes of work inside arbitrary query windows
//! - Reports: half-hour, day, month and range statistics

pub mod aggregate;
pub mod event;
pub mod event_kind;
pub mod phase;
pub mod record;
pub mod report;
pub mod timeline;
pub mod types;

pub use aggregate::{QueryInterval, is_active, work_minutes};
pub use event::{Event, EventProvenance};
pub use event_kind::{EventKind, UnknownEventKind};
pub use phase::{PhaseConfig, WorkPhase, WorkPhases, segment};
pub use record::{ParseError, parse_record};
pub use report::{AnalysisRange, DayStats, Intensity, MonthStats, RangeReport, build_report};
pub use timeline::Timeline;
pub use types::{EventId, SourceId, ValidationError};
